//! Permission assignment entities.

pub mod model;

pub use model::{AssignmentSource, PermissionAssignment};
