//! Permission catalog entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::category::PermissionCategory;

/// A catalog permission definition.
///
/// The `(resource, action)` pair is the unit over which grant/deny is
/// decided; `id` is a stable surrogate. The catalog is immutable per
/// version and managed by an external collaborator.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Permission {
    /// Stable surrogate identifier.
    pub id: Uuid,
    /// Resource the permission applies to (e.g. `"reports"`).
    pub resource: String,
    /// Action on the resource (e.g. `"export"`).
    pub action: String,
    /// Functional category.
    pub category: PermissionCategory,
    /// Optional human-readable description.
    pub description: Option<String>,
    /// When this permission was registered.
    pub created_at: DateTime<Utc>,
}

impl Permission {
    /// The `resource:action` display form used in logs and history search.
    pub fn qualified_name(&self) -> String {
        format!("{}:{}", self.resource, self.action)
    }
}
