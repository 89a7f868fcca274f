//! # orgperm-engine
//!
//! The pure logic of the department permission engine: hierarchy
//! validation and traversal, effective-permission resolution, conflict
//! detection, and mutation planning.
//!
//! Nothing in this crate performs I/O. Every function is deterministic
//! over its inputs, which is what makes conflict re-detection after a
//! resolution trustworthy.

pub mod candidates;
pub mod detector;
pub mod hierarchy;
pub mod plan;
pub mod resolver;
pub mod snapshot;

#[cfg(test)]
pub(crate) mod testkit;

pub use detector::{detect_all_conflicts, detect_conflicts};
pub use hierarchy::DepartmentTree;
pub use plan::{
    AssignmentMutation, ManualTarget, ResolutionPlan, TemplatePlan, plan_resolution,
    plan_template,
};
pub use resolver::resolve_effective;
pub use snapshot::Snapshot;
