//! Permission template entities.

pub mod model;

pub use model::{ApplyMode, PermissionTemplate, TemplateItem};
