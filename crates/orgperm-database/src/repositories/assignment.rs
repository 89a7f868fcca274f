//! Permission assignment repository implementation.
//!
//! Single writes go through the pool; resolution and template plans run
//! their mutations on a caller-owned transaction via the `*_tx` methods,
//! each guarded by the row's `updated_at` optimistic token.

use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use orgperm_core::error::{AppError, ErrorKind};
use orgperm_core::result::AppResult;
use orgperm_entity::assignment::PermissionAssignment;

/// Repository for direct permission assignment rows.
#[derive(Debug, Clone)]
pub struct AssignmentRepository {
    pool: PgPool,
}

/// Field values for creating or upserting a direct assignment row.
#[derive(Debug, Clone)]
pub struct AssignmentWrite {
    pub department_id: Uuid,
    pub permission_id: Uuid,
    pub granted: bool,
    pub priority: i32,
    pub inherit_from_parent: bool,
    pub override_children: bool,
    pub conditions: Option<serde_json::Value>,
}

impl AssignmentRepository {
    /// Create a new assignment repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find an assignment by ID.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<PermissionAssignment>> {
        sqlx::query_as::<_, PermissionAssignment>(
            "SELECT * FROM permission_assignments WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::StorageUnavailable, "Failed to find assignment", e)
        })
    }

    /// Find the direct row for one `(department, permission)` pair.
    pub async fn find_by_pair(
        &self,
        department_id: Uuid,
        permission_id: Uuid,
    ) -> AppResult<Option<PermissionAssignment>> {
        sqlx::query_as::<_, PermissionAssignment>(
            "SELECT * FROM permission_assignments \
             WHERE department_id = $1 AND permission_id = $2",
        )
        .bind(department_id)
        .bind(permission_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::StorageUnavailable, "Failed to find assignment", e)
        })
    }

    /// All direct rows stored at one department.
    pub async fn find_by_department(
        &self,
        department_id: Uuid,
    ) -> AppResult<Vec<PermissionAssignment>> {
        sqlx::query_as::<_, PermissionAssignment>(
            "SELECT * FROM permission_assignments \
             WHERE department_id = $1 ORDER BY created_at ASC",
        )
        .bind(department_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::StorageUnavailable, "Failed to list assignments", e)
        })
    }

    /// Every direct row in the store, for snapshot builds.
    pub async fn find_all(&self) -> AppResult<Vec<PermissionAssignment>> {
        sqlx::query_as::<_, PermissionAssignment>(
            "SELECT * FROM permission_assignments ORDER BY created_at ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::StorageUnavailable, "Failed to list assignments", e)
        })
    }

    /// Create a direct assignment row inside a caller-owned transaction.
    /// A second row for the same pair violates the store's unique
    /// constraint and is reported as `DuplicateAssignment`.
    pub async fn create_tx(
        &self,
        conn: &mut PgConnection,
        data: &AssignmentWrite,
    ) -> AppResult<PermissionAssignment> {
        sqlx::query_as::<_, PermissionAssignment>(
            "INSERT INTO permission_assignments \
             (department_id, permission_id, granted, priority, inherit_from_parent, \
              override_children, conditions) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING *",
        )
        .bind(data.department_id)
        .bind(data.permission_id)
        .bind(data.granted)
        .bind(data.priority)
        .bind(data.inherit_from_parent)
        .bind(data.override_children)
        .bind(&data.conditions)
        .fetch_one(&mut *conn)
        .await
        .map_err(|e| map_write_error(e, data.department_id, data.permission_id))
    }

    /// Delete the direct row for a pair inside a caller-owned
    /// transaction, returning the deleted row.
    pub async fn delete_by_pair_tx(
        &self,
        conn: &mut PgConnection,
        department_id: Uuid,
        permission_id: Uuid,
    ) -> AppResult<Option<PermissionAssignment>> {
        sqlx::query_as::<_, PermissionAssignment>(
            "DELETE FROM permission_assignments \
             WHERE department_id = $1 AND permission_id = $2 RETURNING *",
        )
        .bind(department_id)
        .bind(permission_id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::StorageUnavailable, "Failed to delete assignment", e)
        })
    }

    /// Rewrite an existing row inside a caller-owned transaction. Fails
    /// with `ConcurrentModification` if the row changed since it was
    /// read.
    #[allow(clippy::too_many_arguments)]
    pub async fn update_guarded_tx(
        &self,
        conn: &mut PgConnection,
        assignment_id: Uuid,
        granted: bool,
        priority: i32,
        inherit_from_parent: bool,
        override_children: bool,
        conditions: Option<&serde_json::Value>,
        expected_updated_at: chrono::DateTime<chrono::Utc>,
    ) -> AppResult<PermissionAssignment> {
        sqlx::query_as::<_, PermissionAssignment>(
            "UPDATE permission_assignments \
             SET granted = $2, priority = $3, inherit_from_parent = $4, \
                 override_children = $5, conditions = $6, updated_at = NOW() \
             WHERE id = $1 AND updated_at = $7 RETURNING *",
        )
        .bind(assignment_id)
        .bind(granted)
        .bind(priority)
        .bind(inherit_from_parent)
        .bind(override_children)
        .bind(conditions)
        .bind(expected_updated_at)
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::StorageUnavailable, "Failed to update assignment", e)
        })?
        .ok_or_else(|| {
            AppError::concurrent_modification(format!(
                "Assignment {assignment_id} was modified concurrently; re-read and retry"
            ))
        })
    }

    /// Delete an existing row inside a caller-owned transaction, with
    /// the same optimistic guard as updates.
    pub async fn delete_guarded_tx(
        &self,
        conn: &mut PgConnection,
        assignment_id: Uuid,
        expected_updated_at: chrono::DateTime<chrono::Utc>,
    ) -> AppResult<()> {
        let result = sqlx::query(
            "DELETE FROM permission_assignments WHERE id = $1 AND updated_at = $2",
        )
        .bind(assignment_id)
        .bind(expected_updated_at)
        .execute(&mut *conn)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::StorageUnavailable, "Failed to delete assignment", e)
        })?;

        if result.rows_affected() == 0 {
            return Err(AppError::concurrent_modification(format!(
                "Assignment {assignment_id} was modified concurrently; re-read and retry"
            )));
        }
        Ok(())
    }

    /// Create or rewrite the direct row for a pair inside a caller-owned
    /// transaction. Template application is authoritative for the pairs
    /// it names, so no optimistic guard applies here.
    pub async fn upsert_tx(
        &self,
        conn: &mut PgConnection,
        data: &AssignmentWrite,
    ) -> AppResult<PermissionAssignment> {
        sqlx::query_as::<_, PermissionAssignment>(
            "INSERT INTO permission_assignments \
             (department_id, permission_id, granted, priority, inherit_from_parent, \
              override_children, conditions) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             ON CONFLICT (department_id, permission_id) DO UPDATE \
             SET granted = EXCLUDED.granted, priority = EXCLUDED.priority, \
                 inherit_from_parent = EXCLUDED.inherit_from_parent, \
                 override_children = EXCLUDED.override_children, \
                 conditions = EXCLUDED.conditions, updated_at = NOW() \
             RETURNING *",
        )
        .bind(data.department_id)
        .bind(data.permission_id)
        .bind(data.granted)
        .bind(data.priority)
        .bind(data.inherit_from_parent)
        .bind(data.override_children)
        .bind(&data.conditions)
        .fetch_one(&mut *conn)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::StorageUnavailable, "Failed to upsert assignment", e)
        })
    }
}

fn map_write_error(e: sqlx::Error, department_id: Uuid, permission_id: Uuid) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            return AppError::duplicate_assignment(format!(
                "Department {department_id} already has a direct assignment \
                 for permission {permission_id}"
            ));
        }
    }
    AppError::with_source(ErrorKind::StorageUnavailable, "Failed to create assignment", e)
}
