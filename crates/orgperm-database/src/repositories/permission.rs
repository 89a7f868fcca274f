//! Permission catalog repository implementation.

use sqlx::PgPool;
use uuid::Uuid;

use orgperm_core::error::{AppError, ErrorKind};
use orgperm_core::result::AppResult;
use orgperm_entity::permission::Permission;

/// Repository for the permission catalog.
#[derive(Debug, Clone)]
pub struct PermissionRepository {
    pool: PgPool,
}

impl PermissionRepository {
    /// Create a new permission repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a catalog permission by ID.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Permission>> {
        sqlx::query_as::<_, Permission>("SELECT * FROM permissions WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::StorageUnavailable, "Failed to find permission", e)
            })
    }

    /// Find a catalog permission by its `(resource, action)` pair.
    pub async fn find_by_pair(&self, resource: &str, action: &str) -> AppResult<Option<Permission>> {
        sqlx::query_as::<_, Permission>(
            "SELECT * FROM permissions WHERE resource = $1 AND action = $2",
        )
        .bind(resource)
        .bind(action)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::StorageUnavailable, "Failed to find permission", e)
        })
    }

    /// Fetch the full catalog, ordered by resource then action.
    pub async fn find_all(&self) -> AppResult<Vec<Permission>> {
        sqlx::query_as::<_, Permission>(
            "SELECT * FROM permissions ORDER BY resource ASC, action ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::StorageUnavailable, "Failed to list permissions", e)
        })
    }
}
