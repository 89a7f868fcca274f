//! History/audit entities.

pub mod model;
pub mod operation;

pub use model::{HistoryEntry, NewHistoryEntry};
pub use operation::OperationType;
