//! Permission catalog entities.

pub mod category;
pub mod model;

pub use category::PermissionCategory;
pub use model::Permission;
