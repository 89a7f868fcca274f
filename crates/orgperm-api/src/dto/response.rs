//! Response DTOs.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use orgperm_entity::conflict::Conflict;
use orgperm_entity::effective::EffectivePermissions;

/// Standard success response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request was successful.
    pub success: bool,
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Simple message response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    /// Message.
    pub message: String,
}

/// `GET /api/health` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall status.
    pub status: String,
    /// Crate version.
    pub version: String,
    /// Database connectivity.
    pub database: String,
}

/// Effective permission set for one department.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectivePermissionsResponse {
    /// Department the set was resolved for.
    pub department_id: Uuid,
    /// `"resource:action"` → effective entry.
    pub permissions: EffectivePermissions,
    /// Number of pairs in the set.
    pub count: usize,
}

/// Conflict report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConflictListResponse {
    /// Detected conflicts.
    pub conflicts: Vec<Conflict>,
    /// Number of conflicts.
    pub count: usize,
}

/// `POST /api/history/purge` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurgeHistoryResponse {
    /// Number of entries deleted.
    pub purged: u64,
}
