//! Assign and revoke direct permission rows, with history.

use std::sync::Arc;

use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use orgperm_core::error::{AppError, ErrorKind};
use orgperm_core::result::AppResult;
use orgperm_database::repositories::{
    AssignmentRepository, AssignmentWrite, DepartmentRepository, HistoryRepository,
    PermissionRepository,
};
use orgperm_entity::assignment::PermissionAssignment;
use orgperm_entity::history::{NewHistoryEntry, OperationType};

use crate::context::OperatorContext;
use crate::locks::DepartmentLocks;

/// Request to create a direct assignment.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct AssignPermissionRequest {
    /// Catalog permission to assign.
    pub permission_id: Uuid,
    /// Grant (`true`) or deny (`false`).
    pub granted: bool,
    /// Tie-breaking weight.
    pub priority: i32,
    /// Whether the parent's grant for the pair still competes.
    pub inherit_from_parent: bool,
    /// Whether descendants are barred from re-overriding.
    pub override_children: bool,
    /// Opaque condition bag, stored as-is.
    pub conditions: Option<serde_json::Value>,
    /// Administrator-supplied reason, recorded in history.
    pub reason: String,
}

/// Manages direct permission assignment rows.
#[derive(Debug, Clone)]
pub struct AssignmentService {
    pool: PgPool,
    assignment_repo: Arc<AssignmentRepository>,
    department_repo: Arc<DepartmentRepository>,
    permission_repo: Arc<PermissionRepository>,
    history_repo: Arc<HistoryRepository>,
    locks: Arc<DepartmentLocks>,
}

impl AssignmentService {
    /// Creates a new assignment service.
    pub fn new(
        pool: PgPool,
        assignment_repo: Arc<AssignmentRepository>,
        department_repo: Arc<DepartmentRepository>,
        permission_repo: Arc<PermissionRepository>,
        history_repo: Arc<HistoryRepository>,
        locks: Arc<DepartmentLocks>,
    ) -> Self {
        Self {
            pool,
            assignment_repo,
            department_repo,
            permission_repo,
            history_repo,
            locks,
        }
    }

    /// Create a direct assignment at one department.
    ///
    /// A second row for an already-assigned pair is rejected with
    /// `DuplicateAssignment`; the caller updates or revokes instead.
    pub async fn assign(
        &self,
        ctx: &OperatorContext,
        department_id: Uuid,
        req: AssignPermissionRequest,
    ) -> AppResult<PermissionAssignment> {
        self.department_repo
            .find_by_id(department_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Department {department_id} not found")))?;
        self.permission_repo
            .find_by_id(req.permission_id)
            .await?
            .ok_or_else(|| {
                AppError::not_found(format!("Permission {} not found", req.permission_id))
            })?;

        let _guard = self.locks.acquire(department_id).await;

        let mut tx = begin(&self.pool).await?;
        let created = self
            .assignment_repo
            .create_tx(
                &mut tx,
                &AssignmentWrite {
                    department_id,
                    permission_id: req.permission_id,
                    granted: req.granted,
                    priority: req.priority,
                    inherit_from_parent: req.inherit_from_parent,
                    override_children: req.override_children,
                    conditions: req.conditions.clone(),
                },
            )
            .await?;
        self.history_repo
            .create_tx(
                &mut tx,
                &NewHistoryEntry {
                    department_id,
                    operator_id: ctx.operator_id,
                    operator_name: ctx.operator_name.clone(),
                    operation_type: OperationType::Assign,
                    permission_id: Some(req.permission_id),
                    template_id: None,
                    reason: req.reason.clone(),
                    before_state: None,
                    after_state: Some(serde_json::to_value(&created)?),
                },
            )
            .await?;
        commit(tx).await?;

        info!(
            operator_id = %ctx.operator_id,
            department_id = %department_id,
            permission_id = %req.permission_id,
            granted = req.granted,
            priority = req.priority,
            "Permission assigned"
        );
        Ok(created)
    }

    /// Remove the direct assignment for one pair.
    pub async fn revoke(
        &self,
        ctx: &OperatorContext,
        department_id: Uuid,
        permission_id: Uuid,
        reason: String,
    ) -> AppResult<PermissionAssignment> {
        let _guard = self.locks.acquire(department_id).await;

        // Delete and history entry commit together; a revoke must never
        // land without its audit record.
        let mut tx = begin(&self.pool).await?;
        let removed = self
            .assignment_repo
            .delete_by_pair_tx(&mut tx, department_id, permission_id)
            .await?
            .ok_or_else(|| {
                AppError::not_found(format!(
                    "Department {department_id} has no direct assignment \
                     for permission {permission_id}"
                ))
            })?;
        self.history_repo
            .create_tx(&mut tx, &revoke_entry(ctx, department_id, permission_id, reason, &removed)?)
            .await?;
        commit(tx).await?;

        info!(
            operator_id = %ctx.operator_id,
            department_id = %department_id,
            permission_id = %permission_id,
            "Permission revoked"
        );
        Ok(removed)
    }
}

fn revoke_entry(
    ctx: &OperatorContext,
    department_id: Uuid,
    permission_id: Uuid,
    reason: String,
    removed: &PermissionAssignment,
) -> AppResult<NewHistoryEntry> {
    Ok(NewHistoryEntry {
        department_id,
        operator_id: ctx.operator_id,
        operator_name: ctx.operator_name.clone(),
        operation_type: OperationType::Revoke,
        permission_id: Some(permission_id),
        template_id: None,
        reason,
        before_state: Some(serde_json::to_value(removed)?),
        after_state: None,
    })
}

pub(crate) async fn begin(pool: &PgPool) -> AppResult<sqlx::Transaction<'static, sqlx::Postgres>> {
    pool.begin().await.map_err(|e| {
        AppError::with_source(ErrorKind::StorageUnavailable, "Failed to begin transaction", e)
    })
}

pub(crate) async fn commit(tx: sqlx::Transaction<'static, sqlx::Postgres>) -> AppResult<()> {
    tx.commit().await.map_err(|e| {
        AppError::with_source(ErrorKind::StorageUnavailable, "Failed to commit transaction", e)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_revoke_entry_captures_removed_row() {
        let ctx = OperatorContext::new(Uuid::new_v4(), Some("ops".to_string()));
        let removed = PermissionAssignment {
            id: Uuid::new_v4(),
            department_id: Uuid::new_v4(),
            permission_id: Uuid::new_v4(),
            granted: true,
            priority: 10,
            inherit_from_parent: true,
            override_children: false,
            conditions: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let entry = revoke_entry(
            &ctx,
            removed.department_id,
            removed.permission_id,
            "offboarding".to_string(),
            &removed,
        )
        .unwrap();

        assert_eq!(entry.operation_type, OperationType::Revoke);
        assert_eq!(entry.permission_id, Some(removed.permission_id));
        assert_eq!(
            entry.before_state,
            Some(serde_json::to_value(&removed).unwrap())
        );
        assert!(entry.after_state.is_none());
    }
}
