//! Department repository implementation.
//!
//! The department hierarchy is managed by the upstream organization
//! service; this repository only reads the synchronized rows.

use sqlx::PgPool;
use uuid::Uuid;

use orgperm_core::error::{AppError, ErrorKind};
use orgperm_core::result::AppResult;
use orgperm_entity::department::Department;

/// Repository for department rows.
#[derive(Debug, Clone)]
pub struct DepartmentRepository {
    pool: PgPool,
}

impl DepartmentRepository {
    /// Create a new department repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a department by ID.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Department>> {
        sqlx::query_as::<_, Department>("SELECT * FROM departments WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::StorageUnavailable, "Failed to find department", e)
            })
    }

    /// Fetch every department, ordered by level then name for stable
    /// listings.
    pub async fn find_all(&self) -> AppResult<Vec<Department>> {
        sqlx::query_as::<_, Department>("SELECT * FROM departments ORDER BY level ASC, name ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::StorageUnavailable, "Failed to list departments", e)
            })
    }
}
