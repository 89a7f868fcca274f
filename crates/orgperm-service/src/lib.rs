//! # orgperm-service
//!
//! Business logic service layer for OrgPerm. Each service orchestrates
//! the pure engine, repositories, and the history log to implement
//! application-level use cases.
//!
//! Services follow constructor injection: all dependencies are provided
//! at construction time via `Arc` references. Every write acquires the
//! per-department lock before touching assignment rows.

pub mod assignment;
pub mod conflict;
pub mod context;
pub mod history;
pub mod locks;
pub mod resolution;
pub mod snapshot;
pub mod template;

mod executor;

pub use assignment::AssignmentService;
pub use conflict::ConflictService;
pub use context::OperatorContext;
pub use history::HistoryService;
pub use locks::DepartmentLocks;
pub use resolution::ResolutionService;
pub use snapshot::SnapshotLoader;
pub use template::TemplateService;
