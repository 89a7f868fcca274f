//! Permission template entity models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// How a template is applied to a department.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplyMode {
    /// Create or update the template's assignments, leaving unrelated
    /// direct rows untouched.
    Add,
    /// Additionally delete direct rows not present in the template.
    Replace,
}

impl ApplyMode {
    /// Return the mode as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Replace => "replace",
        }
    }
}

impl fmt::Display for ApplyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ApplyMode {
    type Err = orgperm_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "add" => Ok(Self::Add),
            "replace" => Ok(Self::Replace),
            _ => Err(orgperm_core::AppError::validation(format!(
                "Invalid apply mode: '{s}'. Expected one of: add, replace"
            ))),
        }
    }
}

/// A named, reusable bundle of permission grants.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PermissionTemplate {
    /// Unique template identifier.
    pub id: Uuid,
    /// Unique display name (e.g. `"Viewer"`).
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// When this template was created.
    pub created_at: DateTime<Utc>,
}

/// One permission grant inside a template.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TemplateItem {
    /// Unique item identifier.
    pub id: Uuid,
    /// Owning template.
    pub template_id: Uuid,
    /// Catalog permission to assign.
    pub permission_id: Uuid,
    /// Grant or deny.
    pub granted: bool,
    /// Priority the created assignment receives.
    pub priority: i32,
    /// `inherit_from_parent` flag for the created assignment.
    pub inherit_from_parent: bool,
    /// `override_children` flag for the created assignment.
    pub override_children: bool,
}
