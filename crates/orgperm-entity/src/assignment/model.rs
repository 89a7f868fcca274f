//! Permission assignment entity model.
//!
//! Assignment rows are the only mutable permission state. At most one
//! direct row exists per `(department_id, permission_id)` pair; a second
//! one is rejected at write time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Where an effective value came from, relative to the department being
/// evaluated. Derived at resolution time, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssignmentSource {
    /// The row lives at the department being evaluated.
    Direct,
    /// The value was derived from an ancestor's direct row.
    Inherited,
}

impl AssignmentSource {
    /// Return the source as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Direct => "direct",
            Self::Inherited => "inherited",
        }
    }
}

impl fmt::Display for AssignmentSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AssignmentSource {
    type Err = orgperm_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "direct" => Ok(Self::Direct),
            "inherited" => Ok(Self::Inherited),
            _ => Err(orgperm_core::AppError::validation(format!(
                "Invalid assignment source: '{s}'. Expected one of: direct, inherited"
            ))),
        }
    }
}

/// A direct permission grant or denial at one department.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PermissionAssignment {
    /// Unique assignment identifier.
    pub id: Uuid,
    /// Department the row is stored at.
    pub department_id: Uuid,
    /// Catalog permission being granted or denied.
    pub permission_id: Uuid,
    /// Whether the permission is granted (`true`) or denied (`false`).
    pub granted: bool,
    /// Tie-breaking weight; higher wins when candidates compete.
    pub priority: i32,
    /// Whether this department also accepts the parent's grant for the
    /// same permission unless a higher-priority direct row exists here.
    pub inherit_from_parent: bool,
    /// Whether descendants are barred from re-overriding this permission.
    pub override_children: bool,
    /// Opaque key/value condition bag, carried through but never
    /// evaluated by this engine.
    pub conditions: Option<serde_json::Value>,
    /// When this row was created.
    pub created_at: DateTime<Utc>,
    /// When this row was last updated. Doubles as the optimistic
    /// concurrency token on the write path.
    pub updated_at: DateTime<Utc>,
}
