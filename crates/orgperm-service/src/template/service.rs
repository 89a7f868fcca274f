//! Apply permission templates to departments.
//!
//! Each department is one atomic unit: its mutations and history entry
//! commit in one transaction. Units run concurrently; one department
//! failing never rolls back the others, and the caller receives a
//! per-department outcome list.

use std::sync::Arc;

use futures::future::join_all;
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use orgperm_core::error::AppError;
use orgperm_core::result::AppResult;
use orgperm_database::repositories::{AssignmentRepository, HistoryRepository, TemplateRepository};
use orgperm_engine::{plan_template, Snapshot};
use orgperm_entity::history::{NewHistoryEntry, OperationType};
use orgperm_entity::template::{ApplyMode, PermissionTemplate, TemplateItem};

use crate::assignment::service::{begin, commit};
use crate::context::OperatorContext;
use crate::executor::execute_mutations;
use crate::locks::DepartmentLocks;
use crate::snapshot::SnapshotLoader;

/// Request to apply a template.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ApplyTemplateRequest {
    /// Departments to apply the template to.
    pub department_ids: Vec<Uuid>,
    /// `add` or `replace`.
    pub mode: ApplyMode,
    /// Administrator-supplied reason, recorded in history.
    pub reason: String,
}

/// Per-department application result.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct TemplateApplyItem {
    /// Target department.
    pub department_id: Uuid,
    /// Whether the department's unit committed.
    pub succeeded: bool,
    /// Failure detail when it did not.
    pub error: Option<String>,
}

/// Outcome of one apply call.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct TemplateApplyOutcome {
    /// Template that was applied.
    pub template_id: Uuid,
    /// Mode used.
    pub mode: ApplyMode,
    /// One entry per requested department, in request order.
    pub items: Vec<TemplateApplyItem>,
}

/// Applies templates to departments.
#[derive(Debug, Clone)]
pub struct TemplateService {
    pool: PgPool,
    loader: Arc<SnapshotLoader>,
    template_repo: Arc<TemplateRepository>,
    assignment_repo: Arc<AssignmentRepository>,
    history_repo: Arc<HistoryRepository>,
    locks: Arc<DepartmentLocks>,
}

impl TemplateService {
    /// Creates a new template service.
    pub fn new(
        pool: PgPool,
        loader: Arc<SnapshotLoader>,
        template_repo: Arc<TemplateRepository>,
        assignment_repo: Arc<AssignmentRepository>,
        history_repo: Arc<HistoryRepository>,
        locks: Arc<DepartmentLocks>,
    ) -> Self {
        Self {
            pool,
            loader,
            template_repo,
            assignment_repo,
            history_repo,
            locks,
        }
    }

    /// Look up a template by id.
    pub async fn get(&self, template_id: Uuid) -> AppResult<(PermissionTemplate, Vec<TemplateItem>)> {
        let template = self
            .template_repo
            .find_by_id(template_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Template {template_id} not found")))?;
        let items = self.template_repo.find_items(template_id).await?;
        Ok((template, items))
    }

    /// List all templates.
    pub async fn list(&self) -> AppResult<Vec<PermissionTemplate>> {
        self.template_repo.find_all().await
    }

    /// Apply a template to the requested departments.
    pub async fn apply(
        &self,
        ctx: &OperatorContext,
        template_id: Uuid,
        req: ApplyTemplateRequest,
    ) -> AppResult<TemplateApplyOutcome> {
        if req.department_ids.is_empty() {
            return Err(AppError::validation(
                "At least one department id is required",
            ));
        }
        let (template, items) = self.get(template_id).await?;
        let snapshot = self.loader.load().await?;

        let units = req.department_ids.iter().map(|&department_id| {
            self.apply_one(ctx, &snapshot, &template, &items, department_id, req.mode, &req.reason)
        });
        let results = join_all(units).await;

        let items_out: Vec<TemplateApplyItem> = req
            .department_ids
            .iter()
            .zip(results)
            .map(|(&department_id, result)| match result {
                Ok(()) => TemplateApplyItem {
                    department_id,
                    succeeded: true,
                    error: None,
                },
                Err(e) => {
                    warn!(
                        template_id = %template_id,
                        department_id = %department_id,
                        error = %e,
                        "Template unit failed"
                    );
                    TemplateApplyItem {
                        department_id,
                        succeeded: false,
                        error: Some(e.message.clone()),
                    }
                }
            })
            .collect();

        info!(
            operator_id = %ctx.operator_id,
            template_id = %template_id,
            mode = %req.mode,
            departments = items_out.len(),
            succeeded = items_out.iter().filter(|i| i.succeeded).count(),
            "Template applied"
        );
        Ok(TemplateApplyOutcome {
            template_id,
            mode: req.mode,
            items: items_out,
        })
    }

    /// One department's atomic unit: lock, plan, execute, record.
    #[allow(clippy::too_many_arguments)]
    async fn apply_one(
        &self,
        ctx: &OperatorContext,
        snapshot: &Snapshot,
        template: &PermissionTemplate,
        items: &[TemplateItem],
        department_id: Uuid,
        mode: ApplyMode,
        reason: &str,
    ) -> AppResult<()> {
        let _guard = self.locks.acquire(department_id).await;

        let current = snapshot.direct_rows(department_id);
        let plan = plan_template(snapshot, department_id, template.id, items, current, mode)?;

        let mut tx = begin(&self.pool).await?;
        execute_mutations(&self.assignment_repo, &mut tx, &plan.mutations).await?;
        self.history_repo
            .create_tx(
                &mut tx,
                &NewHistoryEntry {
                    department_id,
                    operator_id: ctx.operator_id,
                    operator_name: ctx.operator_name.clone(),
                    operation_type: OperationType::TemplateApply,
                    permission_id: None,
                    template_id: Some(template.id),
                    reason: reason.to_string(),
                    before_state: Some(serde_json::to_value(current)?),
                    after_state: Some(serde_json::to_value(&plan.mutations)?),
                },
            )
            .await?;
        commit(tx).await
    }
}
