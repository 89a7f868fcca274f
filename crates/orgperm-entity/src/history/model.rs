//! History entry entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::operation::OperationType;

/// An immutable record of one permission mutation.
///
/// Entries are append-only; the only supported destructive operation is
/// bulk deletion by retention cutoff.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct HistoryEntry {
    /// Unique entry identifier.
    pub id: Uuid,
    /// Department the mutation applied to.
    pub department_id: Uuid,
    /// Administrator who performed the mutation.
    pub operator_id: Uuid,
    /// Operator display name at the time of the mutation, if supplied.
    pub operator_name: Option<String>,
    /// Kind of mutation.
    pub operation_type: OperationType,
    /// Catalog permission involved, if any.
    pub permission_id: Option<Uuid>,
    /// Template involved, if any.
    pub template_id: Option<Uuid>,
    /// Administrator-supplied reason.
    pub reason: String,
    /// Assignment state before the mutation (JSON snapshot).
    pub before_state: Option<serde_json::Value>,
    /// Assignment state after the mutation (JSON snapshot).
    pub after_state: Option<serde_json::Value>,
    /// When the mutation occurred.
    pub created_at: DateTime<Utc>,
}

/// Data required to append a new history entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewHistoryEntry {
    /// Department the mutation applies to.
    pub department_id: Uuid,
    /// Administrator performing the mutation.
    pub operator_id: Uuid,
    /// Operator display name, if supplied.
    pub operator_name: Option<String>,
    /// Kind of mutation.
    pub operation_type: OperationType,
    /// Catalog permission involved, if any.
    pub permission_id: Option<Uuid>,
    /// Template involved, if any.
    pub template_id: Option<Uuid>,
    /// Administrator-supplied reason.
    pub reason: String,
    /// Assignment state before the mutation.
    pub before_state: Option<serde_json::Value>,
    /// Assignment state after the mutation.
    pub after_state: Option<serde_json::Value>,
}
