//! Effective permission value objects.

pub mod model;

pub use model::{EffectiveEntry, EffectivePermissions, PermissionKey};
