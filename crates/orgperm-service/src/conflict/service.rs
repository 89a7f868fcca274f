//! Resolve and auto-resolve conflicts, with cascade support.
//!
//! Conflicts are ephemeral: a resolve call re-runs detection and matches
//! the requested conflict by its deterministic id, so a stale id (the
//! underlying rows changed since the caller detected) is a clean
//! `NotFound` rather than a blind write.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use orgperm_core::error::AppError;
use orgperm_core::result::AppResult;
use orgperm_database::repositories::{AssignmentRepository, HistoryRepository};
use orgperm_engine::{detect_all_conflicts, detect_conflicts, plan_resolution, ManualTarget, Snapshot};
use orgperm_entity::conflict::{Conflict, ConflictType, ResolutionStrategy};
use orgperm_entity::history::{NewHistoryEntry, OperationType};

use crate::assignment::service::{begin, commit};
use crate::context::OperatorContext;
use crate::executor::execute_mutations;
use crate::locks::DepartmentLocks;
use crate::snapshot::SnapshotLoader;

/// Request to resolve one conflict.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ResolveConflictRequest {
    /// Strategy to apply.
    pub strategy: ResolutionStrategy,
    /// Target state; required for the `manual` strategy.
    pub manual_target: Option<ManualTarget>,
    /// Also apply the strategy to descendants with their own conflicting
    /// row for the same pair.
    pub cascade_to_children: bool,
    /// Administrator-supplied reason, recorded in history.
    pub reason: String,
}

/// Outcome of one resolve call.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ResolutionOutcome {
    /// The conflict that was resolved.
    pub conflict: Conflict,
    /// Strategy applied.
    pub strategy: ResolutionStrategy,
    /// Per-descendant cascade results, ascending department-id order.
    pub cascaded: Vec<CascadeItem>,
}

/// One descendant touched by a cascade.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CascadeItem {
    /// Descendant department.
    pub department_id: Uuid,
    /// The descendant's own conflict for the pair.
    pub conflict_id: Uuid,
    /// Whether the strategy applied cleanly.
    pub resolved: bool,
    /// Failure detail when it did not.
    pub error: Option<String>,
}

/// Outcome of an auto-resolve sweep. Per-item results, never a whole-
/// batch failure.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct AutoResolveOutcome {
    /// Conflicts resolved automatically.
    pub resolved: Vec<AutoResolvedItem>,
    /// Conflicts that require manual review, with the reason.
    pub rejected: Vec<AutoRejectedItem>,
}

/// One automatically resolved conflict.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct AutoResolvedItem {
    pub conflict_id: Uuid,
    pub department_id: Uuid,
    pub resource: String,
    pub action: String,
    pub strategy: ResolutionStrategy,
}

/// One conflict auto-resolution declined to touch. The locator fields
/// are absent when the requested id matched no detected conflict.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct AutoRejectedItem {
    pub conflict_id: Uuid,
    pub department_id: Option<Uuid>,
    pub resource: Option<String>,
    pub action: Option<String>,
    pub reason: String,
}

/// Applies resolution strategies to detected conflicts.
#[derive(Debug, Clone)]
pub struct ConflictService {
    pool: PgPool,
    loader: Arc<SnapshotLoader>,
    assignment_repo: Arc<AssignmentRepository>,
    history_repo: Arc<HistoryRepository>,
    locks: Arc<DepartmentLocks>,
}

impl ConflictService {
    /// Creates a new conflict service.
    pub fn new(
        pool: PgPool,
        loader: Arc<SnapshotLoader>,
        assignment_repo: Arc<AssignmentRepository>,
        history_repo: Arc<HistoryRepository>,
        locks: Arc<DepartmentLocks>,
    ) -> Self {
        Self {
            pool,
            loader,
            assignment_repo,
            history_repo,
            locks,
        }
    }

    /// Resolve one conflict, optionally cascading to descendants.
    pub async fn resolve(
        &self,
        ctx: &OperatorContext,
        conflict_id: Uuid,
        req: ResolveConflictRequest,
    ) -> AppResult<ResolutionOutcome> {
        let snapshot = self.loader.load().await?;
        let all = detect_all_conflicts(&snapshot)?;
        let conflict = all
            .into_iter()
            .find(|c| c.id == conflict_id)
            .ok_or_else(|| {
                AppError::not_found(format!(
                    "Conflict {conflict_id} not found; the underlying assignments may \
                     have changed, re-run detection"
                ))
            })?;

        let cascade_targets = if req.cascade_to_children {
            cascade_targets(&snapshot, &conflict)?
        } else {
            Vec::new()
        };

        let mut affected: Vec<Uuid> = vec![conflict.department_id];
        affected.extend(cascade_targets.iter().map(|c| c.department_id));
        let _guards = self.locks.acquire_many(&affected).await;

        self.apply(ctx, &snapshot, &conflict, req.strategy, req.manual_target.as_ref(), &req.reason)
            .await?;

        let mut cascaded = Vec::with_capacity(cascade_targets.len());
        for descendant in cascade_targets {
            let result = self
                .apply(
                    ctx,
                    &snapshot,
                    &descendant,
                    req.strategy,
                    req.manual_target.as_ref(),
                    &req.reason,
                )
                .await;
            match result {
                Ok(()) => cascaded.push(CascadeItem {
                    department_id: descendant.department_id,
                    conflict_id: descendant.id,
                    resolved: true,
                    error: None,
                }),
                Err(e) => {
                    warn!(
                        department_id = %descendant.department_id,
                        conflict_id = %descendant.id,
                        error = %e,
                        "Cascade step failed"
                    );
                    cascaded.push(CascadeItem {
                        department_id: descendant.department_id,
                        conflict_id: descendant.id,
                        resolved: false,
                        error: Some(e.message.clone()),
                    });
                }
            }
        }

        info!(
            operator_id = %ctx.operator_id,
            conflict_id = %conflict.id,
            department_id = %conflict.department_id,
            strategy = %req.strategy,
            cascaded = cascaded.len(),
            "Conflict resolved"
        );
        Ok(ResolutionOutcome {
            conflict,
            strategy: req.strategy,
            cascaded,
        })
    }

    /// Auto-resolve the requested conflicts, per-item. Ids that match no
    /// detected conflict and conflicts without a deterministic automatic
    /// resolution are reported as rejected, never as a whole-batch
    /// failure. Items are processed in request order.
    pub async fn auto_resolve(
        &self,
        ctx: &OperatorContext,
        conflict_ids: Vec<Uuid>,
        reason: String,
    ) -> AppResult<AutoResolveOutcome> {
        let snapshot = self.loader.load().await?;
        let all = detect_all_conflicts(&snapshot)?;
        let (requested, unknown) = select_requested(all, &conflict_ids);

        let mut resolved = Vec::new();
        let mut rejected: Vec<AutoRejectedItem> = unknown
            .into_iter()
            .map(|id| AutoRejectedItem {
                conflict_id: id,
                department_id: None,
                resource: None,
                action: None,
                reason: "Conflict not found; the underlying assignments may \
                         have changed, re-run detection"
                    .to_string(),
            })
            .collect();

        for conflict in requested {
            let strategy = match auto_strategy(&conflict) {
                Ok(strategy) => strategy,
                Err(why) => {
                    rejected.push(reject(&conflict, why));
                    continue;
                }
            };

            let _guard = self.locks.acquire(conflict.department_id).await;
            match self
                .apply(ctx, &snapshot, &conflict, strategy, None, &reason)
                .await
            {
                Ok(()) => resolved.push(AutoResolvedItem {
                    conflict_id: conflict.id,
                    department_id: conflict.department_id,
                    resource: conflict.resource.clone(),
                    action: conflict.action.clone(),
                    strategy,
                }),
                Err(e) => rejected.push(reject(&conflict, &e.message)),
            }
        }

        info!(
            operator_id = %ctx.operator_id,
            requested = conflict_ids.len(),
            resolved = resolved.len(),
            rejected = rejected.len(),
            "Auto-resolve completed"
        );
        Ok(AutoResolveOutcome { resolved, rejected })
    }

    /// Plan, execute, and record one resolution in a single transaction.
    async fn apply(
        &self,
        ctx: &OperatorContext,
        snapshot: &Snapshot,
        conflict: &Conflict,
        strategy: ResolutionStrategy,
        manual: Option<&ManualTarget>,
        reason: &str,
    ) -> AppResult<()> {
        let plan = plan_resolution(snapshot, conflict, strategy, manual)?;

        let mut tx = begin(&self.pool).await?;
        execute_mutations(&self.assignment_repo, &mut tx, &plan.mutations).await?;
        self.history_repo
            .create_tx(
                &mut tx,
                &NewHistoryEntry {
                    department_id: conflict.department_id,
                    operator_id: ctx.operator_id,
                    operator_name: ctx.operator_name.clone(),
                    operation_type: OperationType::ConflictResolve,
                    permission_id: conflict
                        .conflicting_assignments
                        .first()
                        .map(|r| r.permission_id),
                    template_id: None,
                    reason: reason.to_string(),
                    before_state: Some(serde_json::to_value(&conflict.conflicting_assignments)?),
                    after_state: Some(serde_json::to_value(&plan.mutations)?),
                },
            )
            .await?;
        commit(tx).await
    }
}

fn reject(conflict: &Conflict, reason: &str) -> AutoRejectedItem {
    AutoRejectedItem {
        conflict_id: conflict.id,
        department_id: Some(conflict.department_id),
        resource: Some(conflict.resource.clone()),
        action: Some(conflict.action.clone()),
        reason: reason.to_string(),
    }
}

/// The deterministic strategy for one conflict, or why none exists.
fn auto_strategy(conflict: &Conflict) -> Result<ResolutionStrategy, &'static str> {
    match conflict.conflict_type {
        ConflictType::Redundant => Ok(ResolutionStrategy::KeepParent),
        ConflictType::Contradictory if conflict.auto_resolvable => {
            Ok(ResolutionStrategy::PriorityBased)
        }
        ConflictType::Contradictory => Err("Priority tie requires manual review"),
        ConflictType::Duplicate => Err("Duplicate assignments require manual resolution"),
    }
}

/// Partition detected conflicts against the caller's id list. Matches
/// come back in request order with duplicates collapsed; ids that match
/// nothing come back separately.
fn select_requested(all: Vec<Conflict>, requested: &[Uuid]) -> (Vec<Conflict>, Vec<Uuid>) {
    let mut by_id: HashMap<Uuid, Conflict> = all.into_iter().map(|c| (c.id, c)).collect();
    let mut seen = HashSet::new();
    let mut found = Vec::new();
    let mut unknown = Vec::new();
    for &id in requested {
        if !seen.insert(id) {
            continue;
        }
        match by_id.remove(&id) {
            Some(conflict) => found.push(conflict),
            None => unknown.push(id),
        }
    }
    (found, unknown)
}

#[cfg(test)]
mod tests {
    use super::*;
    use orgperm_entity::conflict::ConflictSeverity;

    fn conflict(conflict_type: ConflictType, auto_resolvable: bool) -> Conflict {
        let department_id = Uuid::new_v4();
        Conflict {
            id: Conflict::deterministic_id(department_id, "reports", "export", conflict_type),
            conflict_type,
            severity: ConflictSeverity::Medium,
            department_id,
            resource: "reports".to_string(),
            action: "export".to_string(),
            conflicting_assignments: Vec::new(),
            auto_resolvable,
        }
    }

    #[test]
    fn test_auto_strategy_per_conflict_type() {
        let redundant = conflict(ConflictType::Redundant, true);
        assert_eq!(
            auto_strategy(&redundant),
            Ok(ResolutionStrategy::KeepParent)
        );

        let arbitrable = conflict(ConflictType::Contradictory, true);
        assert_eq!(
            auto_strategy(&arbitrable),
            Ok(ResolutionStrategy::PriorityBased)
        );

        let tied = conflict(ConflictType::Contradictory, false);
        assert!(auto_strategy(&tied).is_err());

        let duplicate = conflict(ConflictType::Duplicate, false);
        assert!(auto_strategy(&duplicate).is_err());
    }

    #[test]
    fn test_select_requested_limits_to_caller_ids() {
        let a = conflict(ConflictType::Redundant, true);
        let b = conflict(ConflictType::Contradictory, true);
        let untouched = conflict(ConflictType::Contradictory, true);
        let stale = Uuid::new_v4();

        let requested = vec![b.id, stale, a.id, b.id];
        let (found, unknown) =
            select_requested(vec![a.clone(), b.clone(), untouched.clone()], &requested);

        // Request order, duplicate collapsed, nothing beyond the list.
        let found_ids: Vec<Uuid> = found.iter().map(|c| c.id).collect();
        assert_eq!(found_ids, vec![b.id, a.id]);
        assert!(!found_ids.contains(&untouched.id));
        assert_eq!(unknown, vec![stale]);
    }

    #[test]
    fn test_select_requested_empty_list_touches_nothing() {
        let a = conflict(ConflictType::Redundant, true);
        let (found, unknown) = select_requested(vec![a], &[]);
        assert!(found.is_empty());
        assert!(unknown.is_empty());
    }
}

/// Descendants of the conflict's department that carry their own
/// conflicting row for the same pair. Subtrees below a descendant whose
/// own row locks the pair with `override_children` are skipped (that
/// descendant itself is still a target).
fn cascade_targets(snapshot: &Snapshot, conflict: &Conflict) -> AppResult<Vec<Conflict>> {
    let permission_id = match conflict.conflicting_assignments.first() {
        Some(row) => row.permission_id,
        None => return Ok(Vec::new()),
    };
    let base_level = snapshot
        .tree
        .get(conflict.department_id)
        .map(|d| d.level)
        .unwrap_or(0);

    let overrides_pair = |dept: Uuid| {
        snapshot
            .direct_rows(dept)
            .iter()
            .any(|r| r.permission_id == permission_id && r.override_children)
    };

    let mut targets = Vec::new();
    for descendant in snapshot.tree.descendants(conflict.department_id)? {
        let blocked = snapshot
            .tree
            .get(descendant)
            .map(|d| {
                d.path.iter().any(|&ancestor| {
                    ancestor != descendant
                        && ancestor != conflict.department_id
                        && snapshot
                            .tree
                            .get(ancestor)
                            .is_some_and(|a| a.level > base_level)
                        && overrides_pair(ancestor)
                })
            })
            .unwrap_or(true);
        if blocked {
            continue;
        }
        if let Some(own) = detect_conflicts(snapshot, descendant)?
            .into_iter()
            .find(|c| c.resource == conflict.resource && c.action == conflict.action)
        {
            targets.push(own);
        }
    }
    targets.sort_by_key(|c| c.department_id);
    Ok(targets)
}
