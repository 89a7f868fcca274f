//! Conflict entities.

pub mod kind;
pub mod model;
pub mod strategy;

pub use kind::{ConflictSeverity, ConflictType};
pub use model::Conflict;
pub use strategy::ResolutionStrategy;
