//! Direct assignment management.

pub mod service;

pub use service::{AssignPermissionRequest, AssignmentService};
