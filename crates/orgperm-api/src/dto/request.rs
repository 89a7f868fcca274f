//! Request DTOs.

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use orgperm_engine::ManualTarget;
use orgperm_entity::conflict::ResolutionStrategy;
use orgperm_entity::template::ApplyMode;

/// Body for `POST /api/departments/{id}/permissions`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AssignPermissionBody {
    /// Catalog permission to assign.
    pub permission_id: Uuid,
    /// Grant (`true`) or deny (`false`).
    pub granted: bool,
    /// Tie-breaking weight.
    #[serde(default)]
    pub priority: i32,
    /// Whether the parent's grant still competes for the pair.
    #[serde(default = "default_true")]
    pub inherit_from_parent: bool,
    /// Whether descendants are barred from re-overriding.
    #[serde(default)]
    pub override_children: bool,
    /// Opaque condition bag.
    #[serde(default)]
    pub conditions: Option<serde_json::Value>,
    /// Reason recorded in history.
    #[validate(length(min = 1, max = 500))]
    pub reason: String,
}

/// Query parameters for `DELETE /api/departments/{id}/permissions/{permission_id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevokeParams {
    /// Reason recorded in history.
    #[serde(default = "default_revoke_reason")]
    pub reason: String,
}

fn default_revoke_reason() -> String {
    "revoked".to_string()
}

/// Body for `POST /api/conflicts/{id}/resolve`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ResolveConflictBody {
    /// Strategy to apply.
    pub strategy: ResolutionStrategy,
    /// Target state; required for the `manual` strategy.
    #[serde(default)]
    pub manual_target: Option<ManualTarget>,
    /// Also apply the strategy to conflicting descendants.
    #[serde(default)]
    pub cascade_to_children: bool,
    /// Reason recorded in history.
    #[validate(length(min = 1, max = 500))]
    pub reason: String,
}

/// Body for `POST /api/conflicts/auto-resolve`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AutoResolveBody {
    /// Conflicts to auto-resolve; results are per-item, in this order.
    #[validate(length(min = 1))]
    pub conflict_ids: Vec<Uuid>,
    /// Reason recorded in history for each resolved conflict.
    #[serde(default = "default_auto_reason")]
    #[validate(length(min = 1, max = 500))]
    pub reason: String,
}

fn default_auto_reason() -> String {
    "auto-resolved".to_string()
}

/// Body for `POST /api/templates/{id}/apply`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ApplyTemplateBody {
    /// Departments to apply the template to.
    #[validate(length(min = 1))]
    pub department_ids: Vec<Uuid>,
    /// `add` or `replace`.
    pub mode: ApplyMode,
    /// Reason recorded in history.
    #[validate(length(min = 1, max = 500))]
    pub reason: String,
}

/// Body for `POST /api/history/purge`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurgeHistoryBody {
    /// Cutoff in days; the configured retention applies when omitted.
    #[serde(default)]
    pub older_than_days: Option<u32>,
}

/// Query parameters for `GET /api/history`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryQueryParams {
    /// Restrict to one department.
    #[serde(default)]
    pub department_id: Option<Uuid>,
    /// Restrict to one operator.
    #[serde(default)]
    pub operator_id: Option<Uuid>,
    /// Restrict to one operation type (snake_case).
    #[serde(default)]
    pub operation_type: Option<String>,
    /// Restrict to one catalog permission.
    #[serde(default)]
    pub permission_id: Option<Uuid>,
    /// Entries at or after this instant (RFC 3339).
    #[serde(default)]
    pub from: Option<chrono::DateTime<chrono::Utc>>,
    /// Entries strictly before this instant (RFC 3339).
    #[serde(default)]
    pub to: Option<chrono::DateTime<chrono::Utc>>,
    /// Free-text filter.
    #[serde(default)]
    pub q: Option<String>,
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auto_resolve_body_carries_conflict_ids() {
        let id = Uuid::new_v4();
        let body: AutoResolveBody = serde_json::from_str(&format!(
            r#"{{"conflict_ids": ["{id}"], "reason": "cleanup"}}"#
        ))
        .unwrap();
        assert_eq!(body.conflict_ids, vec![id]);

        // A body that names no conflicts is not a global sweep; it is a
        // bad request.
        assert!(serde_json::from_str::<AutoResolveBody>(r#"{"reason": "cleanup"}"#).is_err());
        let empty: AutoResolveBody =
            serde_json::from_str(r#"{"conflict_ids": [], "reason": "cleanup"}"#).unwrap();
        assert!(empty.validate().is_err());
    }
}
