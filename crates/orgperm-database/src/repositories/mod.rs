//! Repository implementations for all OrgPerm entities.

pub mod assignment;
pub mod department;
pub mod history;
pub mod permission;
pub mod template;

pub use assignment::{AssignmentRepository, AssignmentWrite};
pub use department::DepartmentRepository;
pub use history::{HistoryFilter, HistoryRepository};
pub use permission::PermissionRepository;
pub use template::TemplateRepository;
