//! History operation type enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The kind of mutation a history entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "operation_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum OperationType {
    /// A single direct assignment was created or updated.
    Assign,
    /// A single direct assignment was removed.
    Revoke,
    /// Multiple assignments created/updated in one call.
    BatchAssign,
    /// Multiple assignments removed in one call.
    BatchRevoke,
    /// A template was applied to a department.
    TemplateApply,
    /// A conflict was resolved.
    ConflictResolve,
}

impl OperationType {
    /// Return the operation as a snake_case string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Assign => "assign",
            Self::Revoke => "revoke",
            Self::BatchAssign => "batch_assign",
            Self::BatchRevoke => "batch_revoke",
            Self::TemplateApply => "template_apply",
            Self::ConflictResolve => "conflict_resolve",
        }
    }
}

impl fmt::Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for OperationType {
    type Err = orgperm_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "assign" => Ok(Self::Assign),
            "revoke" => Ok(Self::Revoke),
            "batch_assign" => Ok(Self::BatchAssign),
            "batch_revoke" => Ok(Self::BatchRevoke),
            "template_apply" => Ok(Self::TemplateApply),
            "conflict_resolve" => Ok(Self::ConflictResolve),
            _ => Err(orgperm_core::AppError::validation(format!(
                "Invalid operation type: '{s}'. Expected one of: assign, revoke, \
                 batch_assign, batch_revoke, template_apply, conflict_resolve"
            ))),
        }
    }
}
