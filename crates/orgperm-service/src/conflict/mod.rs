//! Conflict resolution.

pub mod service;

pub use service::{
    AutoRejectedItem, AutoResolveOutcome, AutoResolvedItem, CascadeItem, ConflictService,
    ResolutionOutcome, ResolveConflictRequest,
};
