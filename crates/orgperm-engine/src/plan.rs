//! Mutation planning.
//!
//! Turns a chosen resolution strategy or a template application into an
//! explicit list of assignment mutations. Planning is pure; the service
//! layer executes a plan inside one per-department transaction, which
//! keeps every strategy decision unit-testable without a store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use orgperm_core::{AppError, AppResult};
use orgperm_entity::assignment::PermissionAssignment;
use orgperm_entity::conflict::{Conflict, ConflictType, ResolutionStrategy};
use orgperm_entity::template::{ApplyMode, TemplateItem};

use crate::snapshot::Snapshot;

/// A single write against the assignment store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AssignmentMutation {
    /// Rewrite an existing direct row, guarded by its optimistic token.
    Update {
        assignment_id: Uuid,
        department_id: Uuid,
        permission_id: Uuid,
        granted: bool,
        priority: i32,
        inherit_from_parent: bool,
        override_children: bool,
        conditions: Option<Value>,
        expected_updated_at: DateTime<Utc>,
    },
    /// Remove an existing direct row, guarded by its optimistic token.
    Delete {
        assignment_id: Uuid,
        department_id: Uuid,
        permission_id: Uuid,
        expected_updated_at: DateTime<Utc>,
    },
    /// Create the direct row for a pair, or rewrite it if one exists.
    /// Used by template application, where the template is authoritative.
    Upsert {
        department_id: Uuid,
        permission_id: Uuid,
        granted: bool,
        priority: i32,
        inherit_from_parent: bool,
        override_children: bool,
    },
}

/// The writes that implement one conflict resolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolutionPlan {
    /// Conflict being resolved.
    pub conflict_id: Uuid,
    /// Department whose rows are touched.
    pub department_id: Uuid,
    /// Strategy that produced the plan.
    pub strategy: ResolutionStrategy,
    /// Ordered mutations to execute in one transaction.
    pub mutations: Vec<AssignmentMutation>,
}

/// Caller-supplied target state for the `manual` strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManualTarget {
    pub granted: bool,
    pub priority: i32,
    pub inherit_from_parent: bool,
    pub override_children: bool,
    pub conditions: Option<Value>,
}

/// The writes that apply one template to one department.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplatePlan {
    /// Department the template is applied to.
    pub department_id: Uuid,
    /// Template being applied.
    pub template_id: Uuid,
    /// Ordered mutations to execute in one transaction.
    pub mutations: Vec<AssignmentMutation>,
}

/// Plan the mutations for resolving `conflict` with `strategy`.
pub fn plan_resolution(
    snapshot: &Snapshot,
    conflict: &Conflict,
    strategy: ResolutionStrategy,
    manual: Option<&ManualTarget>,
) -> AppResult<ResolutionPlan> {
    let mutations = match conflict.conflict_type {
        ConflictType::Duplicate => plan_duplicate(conflict, strategy, manual)?,
        ConflictType::Contradictory | ConflictType::Redundant => {
            plan_layered(snapshot, conflict, strategy, manual)?
        }
    };

    Ok(ResolutionPlan {
        conflict_id: conflict.id,
        department_id: conflict.department_id,
        strategy,
        mutations,
    })
}

/// Same-level twins have no parent/child axis; only an explicit manual
/// target can say which state survives.
fn plan_duplicate(
    conflict: &Conflict,
    strategy: ResolutionStrategy,
    manual: Option<&ManualTarget>,
) -> AppResult<Vec<AssignmentMutation>> {
    match strategy {
        ResolutionStrategy::Manual => {}
        other => {
            return Err(AppError::invalid_strategy(format!(
                "Strategy '{other}' does not apply to duplicate conflicts; use 'manual'"
            )));
        }
    }
    let target = manual.ok_or_else(|| {
        AppError::validation("The manual strategy requires a target assignment state")
    })?;

    let mut rows: Vec<&PermissionAssignment> = conflict
        .conflicting_assignments
        .iter()
        .filter(|r| r.department_id == conflict.department_id)
        .collect();
    if rows.len() < 2 {
        return Err(AppError::internal(
            "Duplicate conflict carries fewer than two same-level rows",
        ));
    }
    rows.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));

    let survivor = rows[0];
    let mut mutations = vec![update_to_target(survivor, target)];
    for twin in &rows[1..] {
        mutations.push(delete_row(twin));
    }
    Ok(mutations)
}

fn plan_layered(
    snapshot: &Snapshot,
    conflict: &Conflict,
    strategy: ResolutionStrategy,
    manual: Option<&ManualTarget>,
) -> AppResult<Vec<AssignmentMutation>> {
    let direct = conflict
        .conflicting_assignments
        .iter()
        .find(|r| r.department_id == conflict.department_id)
        .ok_or_else(|| AppError::internal("Conflict carries no direct assignment"))?;
    let ancestors: Vec<&PermissionAssignment> = conflict
        .conflicting_assignments
        .iter()
        .filter(|r| r.department_id != conflict.department_id)
        .collect();

    let mutations = match strategy {
        ResolutionStrategy::KeepParent => vec![delete_row(direct)],
        ResolutionStrategy::KeepChild => vec![cut_inheritance(direct)],
        ResolutionStrategy::Merge => {
            if conflict
                .conflicting_assignments
                .iter()
                .any(|r| r.granted != direct.granted)
            {
                return Err(AppError::invalid_strategy(
                    "Merge only applies when the disagreement is on conditions, \
                     not on the granted value",
                ));
            }
            vec![merge_conditions(direct, &ancestors)]
        }
        ResolutionStrategy::PriorityBased => {
            if conflict.conflict_type == ConflictType::Redundant {
                // Nothing to arbitrate: the direct row restates the
                // inherited value and can simply go.
                vec![delete_row(direct)]
            } else if direct_wins_by_priority(snapshot, conflict, direct, &ancestors)? {
                vec![cut_inheritance(direct)]
            } else {
                vec![delete_row(direct)]
            }
        }
        ResolutionStrategy::Manual => {
            let target = manual.ok_or_else(|| {
                AppError::validation("The manual strategy requires a target assignment state")
            })?;
            if snapshot.permission(direct.permission_id).is_none() {
                return Err(AppError::not_found(format!(
                    "Permission {} not found in catalog",
                    direct.permission_id
                )));
            }
            vec![update_to_target(direct, target)]
        }
    };
    Ok(mutations)
}

/// Re-run the arbitration between the direct row and its inherited
/// competitors: a nearest override wins outright, otherwise priority
/// with proximity as the tie-breaker.
fn direct_wins_by_priority(
    snapshot: &Snapshot,
    conflict: &Conflict,
    direct: &PermissionAssignment,
    ancestors: &[&PermissionAssignment],
) -> AppResult<bool> {
    let target_level = snapshot
        .tree
        .get(conflict.department_id)
        .ok_or_else(|| {
            AppError::not_found(format!("Department {} not found", conflict.department_id))
        })?
        .level;

    let mut best: Option<(&PermissionAssignment, i32)> = None;
    for row in ancestors {
        let level = snapshot
            .tree
            .get(row.department_id)
            .ok_or_else(|| {
                AppError::not_found(format!("Department {} not found", row.department_id))
            })?
            .level;
        let distance = target_level - level;
        match best {
            Some((b, best_distance)) => {
                let closer_override =
                    row.override_children && (!b.override_children || distance < best_distance);
                let beats = if b.override_children {
                    closer_override
                } else if row.override_children {
                    true
                } else {
                    (row.priority, -distance) > (b.priority, -best_distance)
                };
                if beats {
                    best = Some((row, distance));
                }
            }
            None => best = Some((row, distance)),
        }
    }

    match best {
        // An ancestor override is authoritative below it, full stop.
        Some((b, _)) if b.override_children => Ok(false),
        Some((b, _)) => Ok(direct.priority >= b.priority),
        None => Ok(true),
    }
}

fn delete_row(row: &PermissionAssignment) -> AssignmentMutation {
    AssignmentMutation::Delete {
        assignment_id: row.id,
        department_id: row.department_id,
        permission_id: row.permission_id,
        expected_updated_at: row.updated_at,
    }
}

/// Keep the direct row but stop accepting the parent's grant, which
/// removes the competing inherited candidate for the pair.
fn cut_inheritance(row: &PermissionAssignment) -> AssignmentMutation {
    AssignmentMutation::Update {
        assignment_id: row.id,
        department_id: row.department_id,
        permission_id: row.permission_id,
        granted: row.granted,
        priority: row.priority,
        inherit_from_parent: false,
        override_children: row.override_children,
        conditions: row.conditions.clone(),
        expected_updated_at: row.updated_at,
    }
}

fn update_to_target(row: &PermissionAssignment, target: &ManualTarget) -> AssignmentMutation {
    AssignmentMutation::Update {
        assignment_id: row.id,
        department_id: row.department_id,
        permission_id: row.permission_id,
        granted: target.granted,
        priority: target.priority,
        inherit_from_parent: target.inherit_from_parent,
        override_children: target.override_children,
        conditions: target.conditions.clone(),
        expected_updated_at: row.updated_at,
    }
}

/// Union the opaque condition bags, farthest ancestor first so the
/// child's values win key collisions. The engine never interprets the
/// values themselves.
fn merge_conditions(
    direct: &PermissionAssignment,
    ancestors: &[&PermissionAssignment],
) -> AssignmentMutation {
    let mut merged: Map<String, Value> = Map::new();
    let mut layers: Vec<&PermissionAssignment> = ancestors.to_vec();
    layers.reverse();
    layers.push(direct);
    for row in layers {
        if let Some(Value::Object(bag)) = &row.conditions {
            for (key, value) in bag {
                merged.insert(key.clone(), value.clone());
            }
        }
    }
    let conditions = if merged.is_empty() {
        None
    } else {
        Some(Value::Object(merged))
    };

    AssignmentMutation::Update {
        assignment_id: direct.id,
        department_id: direct.department_id,
        permission_id: direct.permission_id,
        granted: direct.granted,
        priority: direct.priority,
        inherit_from_parent: direct.inherit_from_parent,
        override_children: direct.override_children,
        conditions,
        expected_updated_at: direct.updated_at,
    }
}

/// Plan the mutations that apply a template to one department.
///
/// `add` upserts every template item; `replace` additionally deletes
/// direct rows for pairs the template does not mention.
pub fn plan_template(
    snapshot: &Snapshot,
    department_id: Uuid,
    template_id: Uuid,
    items: &[TemplateItem],
    current_rows: &[PermissionAssignment],
    mode: ApplyMode,
) -> AppResult<TemplatePlan> {
    if !snapshot.tree.contains(department_id) {
        return Err(AppError::not_found(format!(
            "Department {department_id} not found"
        )));
    }

    let mut mutations = Vec::with_capacity(items.len());
    for item in items {
        if snapshot.permission(item.permission_id).is_none() {
            return Err(AppError::not_found(format!(
                "Template item references unknown permission {}",
                item.permission_id
            )));
        }
        mutations.push(AssignmentMutation::Upsert {
            department_id,
            permission_id: item.permission_id,
            granted: item.granted,
            priority: item.priority,
            inherit_from_parent: item.inherit_from_parent,
            override_children: item.override_children,
        });
    }

    if mode == ApplyMode::Replace {
        for row in current_rows {
            if !items.iter().any(|i| i.permission_id == row.permission_id) {
                mutations.push(delete_row(row));
            }
        }
    }

    Ok(TemplatePlan {
        department_id,
        template_id,
        mutations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detector::detect_conflicts;
    use crate::resolver::resolve_effective;
    use crate::snapshot::Snapshot;
    use crate::testkit::*;
    use orgperm_entity::effective::PermissionKey;

    /// Apply a plan's mutations to an in-memory row set, mimicking what
    /// the service layer does in a transaction.
    fn apply(
        snapshot: &Snapshot,
        mutations: &[AssignmentMutation],
    ) -> Vec<PermissionAssignment> {
        let mut rows: Vec<PermissionAssignment> = snapshot
            .assignments
            .values()
            .flatten()
            .cloned()
            .collect();
        for mutation in mutations {
            match mutation {
                AssignmentMutation::Delete { assignment_id, .. } => {
                    rows.retain(|r| r.id != *assignment_id);
                }
                AssignmentMutation::Update {
                    assignment_id,
                    granted,
                    priority,
                    inherit_from_parent,
                    override_children,
                    conditions,
                    ..
                } => {
                    let row = rows.iter_mut().find(|r| r.id == *assignment_id).unwrap();
                    row.granted = *granted;
                    row.priority = *priority;
                    row.inherit_from_parent = *inherit_from_parent;
                    row.override_children = *override_children;
                    row.conditions = conditions.clone();
                }
                AssignmentMutation::Upsert {
                    department_id,
                    permission_id,
                    granted,
                    priority,
                    inherit_from_parent,
                    override_children,
                } => {
                    if let Some(row) = rows.iter_mut().find(|r| {
                        r.department_id == *department_id && r.permission_id == *permission_id
                    }) {
                        row.granted = *granted;
                        row.priority = *priority;
                        row.inherit_from_parent = *inherit_from_parent;
                        row.override_children = *override_children;
                    } else {
                        rows.push(PermissionAssignment {
                            id: uuid::Uuid::new_v4(),
                            department_id: *department_id,
                            permission_id: *permission_id,
                            granted: *granted,
                            priority: *priority,
                            inherit_from_parent: *inherit_from_parent,
                            override_children: *override_children,
                            conditions: None,
                            created_at: chrono::Utc::now(),
                            updated_at: chrono::Utc::now(),
                        });
                    }
                }
            }
        }
        rows
    }

    fn reapply(snapshot: &Snapshot, rows: Vec<PermissionAssignment>) -> Snapshot {
        Snapshot::new(
            snapshot.tree.clone(),
            snapshot.catalog.values().cloned().collect(),
            rows,
        )
    }

    #[test]
    fn test_keep_parent_deletes_direct_row() {
        let mut fx = Fixture::new();
        let eng = fx.department("Eng", None);
        let backend = fx.department("Backend", Some(eng));
        let export = fx.permission("reports", "export", Category::Business);
        fx.assign(eng, export, true, 10);
        let child_row = fx.assign(backend, export, false, 5);

        let snapshot = fx.snapshot();
        let conflict = &detect_conflicts(&snapshot, backend).unwrap()[0];
        let plan =
            plan_resolution(&snapshot, conflict, ResolutionStrategy::KeepParent, None).unwrap();

        assert_eq!(plan.mutations.len(), 1);
        assert!(matches!(
            plan.mutations[0],
            AssignmentMutation::Delete { assignment_id, .. } if assignment_id == fx.row(child_row).id
        ));

        let after = reapply(&snapshot, apply(&snapshot, &plan.mutations));
        let effective = resolve_effective(&after, backend).unwrap();
        assert!(effective[&PermissionKey::new("reports", "export")].granted);
        assert!(detect_conflicts(&after, backend).unwrap().is_empty());
    }

    #[test]
    fn test_keep_child_cuts_inheritance() {
        let mut fx = Fixture::new();
        let eng = fx.department("Eng", None);
        let backend = fx.department("Backend", Some(eng));
        let export = fx.permission("reports", "export", Category::Business);
        fx.assign(eng, export, true, 10);
        fx.assign(backend, export, false, 5);

        let snapshot = fx.snapshot();
        let conflict = &detect_conflicts(&snapshot, backend).unwrap()[0];
        let plan =
            plan_resolution(&snapshot, conflict, ResolutionStrategy::KeepChild, None).unwrap();

        let after = reapply(&snapshot, apply(&snapshot, &plan.mutations));
        let effective = resolve_effective(&after, backend).unwrap();
        let entry = &effective[&PermissionKey::new("reports", "export")];
        assert!(!entry.granted, "the child's denial must stand");
        assert!(detect_conflicts(&after, backend).unwrap().is_empty());
    }

    #[test]
    fn test_priority_based_deletes_losing_child() {
        // Scenario: Eng grants at 10, Backend denies at 5; Eng wins and
        // Backend's row goes.
        let mut fx = Fixture::new();
        let eng = fx.department("Eng", None);
        let backend = fx.department("Backend", Some(eng));
        let export = fx.permission("reports", "export", Category::Business);
        fx.assign(eng, export, true, 10);
        fx.assign(backend, export, false, 5);

        let snapshot = fx.snapshot();
        let conflict = &detect_conflicts(&snapshot, backend).unwrap()[0];
        let plan =
            plan_resolution(&snapshot, conflict, ResolutionStrategy::PriorityBased, None).unwrap();

        let after = reapply(&snapshot, apply(&snapshot, &plan.mutations));
        let effective = resolve_effective(&after, backend).unwrap();
        let entry = &effective[&PermissionKey::new("reports", "export")];
        assert!(entry.granted, "Eng's higher-priority grant wins");
        assert!(detect_conflicts(&after, backend).unwrap().is_empty());
    }

    #[test]
    fn test_priority_based_keeps_winning_child() {
        let mut fx = Fixture::new();
        let eng = fx.department("Eng", None);
        let backend = fx.department("Backend", Some(eng));
        let export = fx.permission("reports", "export", Category::Business);
        fx.assign(eng, export, true, 5);
        fx.assign(backend, export, false, 10);

        let snapshot = fx.snapshot();
        let conflict = &detect_conflicts(&snapshot, backend).unwrap()[0];
        let plan =
            plan_resolution(&snapshot, conflict, ResolutionStrategy::PriorityBased, None).unwrap();

        let after = reapply(&snapshot, apply(&snapshot, &plan.mutations));
        let effective = resolve_effective(&after, backend).unwrap();
        assert!(!effective[&PermissionKey::new("reports", "export")].granted);
        assert!(
            detect_conflicts(&after, backend).unwrap().is_empty(),
            "cutting inheritance removes the competing candidate"
        );
    }

    #[test]
    fn test_resolution_is_idempotent() {
        // Applying the same plan twice ends in the same state as once.
        let mut fx = Fixture::new();
        let eng = fx.department("Eng", None);
        let backend = fx.department("Backend", Some(eng));
        let export = fx.permission("reports", "export", Category::Business);
        fx.assign(eng, export, true, 10);
        fx.assign(backend, export, false, 5);

        let snapshot = fx.snapshot();
        let conflict = &detect_conflicts(&snapshot, backend).unwrap()[0];
        let plan =
            plan_resolution(&snapshot, conflict, ResolutionStrategy::PriorityBased, None).unwrap();

        let once = apply(&snapshot, &plan.mutations);
        let twice = apply(&reapply(&snapshot, once.clone()), &plan.mutations);
        let effective_once = resolve_effective(&reapply(&snapshot, once), backend).unwrap();
        let effective_twice = resolve_effective(&reapply(&snapshot, twice), backend).unwrap();
        assert_eq!(effective_once, effective_twice);
    }

    #[test]
    fn test_merge_rejects_granted_disagreement() {
        let mut fx = Fixture::new();
        let eng = fx.department("Eng", None);
        let backend = fx.department("Backend", Some(eng));
        let export = fx.permission("reports", "export", Category::Business);
        fx.assign(eng, export, true, 10);
        fx.assign(backend, export, false, 5);

        let snapshot = fx.snapshot();
        let conflict = &detect_conflicts(&snapshot, backend).unwrap()[0];
        let err = plan_resolution(&snapshot, conflict, ResolutionStrategy::Merge, None)
            .unwrap_err();
        assert_eq!(err.kind, orgperm_core::error::ErrorKind::InvalidStrategy);
    }

    #[test]
    fn test_merge_unions_condition_bags() {
        let mut fx = Fixture::new();
        let eng = fx.department("Eng", None);
        let backend = fx.department("Backend", Some(eng));
        let export = fx.permission("reports", "export", Category::Business);
        fx.assign_full(
            eng,
            export,
            true,
            10,
            true,
            false,
            Some(serde_json::json!({"region": "eu", "shift": "day"})),
        );
        fx.assign_full(
            backend,
            export,
            true,
            5,
            true,
            false,
            Some(serde_json::json!({"region": "us"})),
        );

        let snapshot = fx.snapshot();
        let conflict = &detect_conflicts(&snapshot, backend).unwrap()[0];
        let plan = plan_resolution(&snapshot, conflict, ResolutionStrategy::Merge, None).unwrap();

        match &plan.mutations[0] {
            AssignmentMutation::Update { conditions, .. } => {
                let bag = conditions.as_ref().unwrap();
                assert_eq!(bag["region"], "us", "child value wins key collisions");
                assert_eq!(bag["shift"], "day", "ancestor-only keys are kept");
            }
            other => panic!("expected an update, got {other:?}"),
        }
    }

    #[test]
    fn test_manual_requires_target_state() {
        let mut fx = Fixture::new();
        let eng = fx.department("Eng", None);
        let backend = fx.department("Backend", Some(eng));
        let export = fx.permission("reports", "export", Category::Business);
        fx.assign(eng, export, true, 10);
        fx.assign(backend, export, false, 5);

        let snapshot = fx.snapshot();
        let conflict = &detect_conflicts(&snapshot, backend).unwrap()[0];
        let err =
            plan_resolution(&snapshot, conflict, ResolutionStrategy::Manual, None).unwrap_err();
        assert_eq!(err.kind, orgperm_core::error::ErrorKind::Validation);
    }

    #[test]
    fn test_duplicate_accepts_only_manual() {
        let mut fx = Fixture::new();
        let eng = fx.department("Eng", None);
        let export = fx.permission("reports", "export", Category::Business);
        fx.assign(eng, export, true, 10);
        fx.assign(eng, export, false, 5);

        let snapshot = fx.snapshot();
        let conflict = &detect_conflicts(&snapshot, eng).unwrap()[0];

        let err = plan_resolution(&snapshot, conflict, ResolutionStrategy::KeepParent, None)
            .unwrap_err();
        assert_eq!(err.kind, orgperm_core::error::ErrorKind::InvalidStrategy);

        let target = ManualTarget {
            granted: true,
            priority: 10,
            inherit_from_parent: true,
            override_children: false,
            conditions: None,
        };
        let plan =
            plan_resolution(&snapshot, conflict, ResolutionStrategy::Manual, Some(&target))
                .unwrap();
        // One survivor updated, one twin deleted.
        assert_eq!(plan.mutations.len(), 2);

        let after = reapply(&snapshot, apply(&snapshot, &plan.mutations));
        assert!(detect_conflicts(&after, eng).unwrap().is_empty());
    }

    #[test]
    fn test_template_add_leaves_unrelated_rows() {
        let mut fx = Fixture::new();
        let eng = fx.department("Eng", None);
        let view = fx.permission("reports", "view", Category::General);
        let export = fx.permission("reports", "export", Category::Business);
        fx.assign(eng, export, true, 10);

        let snapshot = fx.snapshot();
        let template_id = uuid::Uuid::new_v4();
        let items = vec![TemplateItem {
            id: uuid::Uuid::new_v4(),
            template_id,
            permission_id: view,
            granted: true,
            priority: 0,
            inherit_from_parent: true,
            override_children: false,
        }];
        let current = snapshot.direct_rows(eng).to_vec();
        let plan =
            plan_template(&snapshot, eng, template_id, &items, &current, ApplyMode::Add).unwrap();

        let after = reapply(&snapshot, apply(&snapshot, &plan.mutations));
        let effective = resolve_effective(&after, eng).unwrap();
        assert!(effective[&PermissionKey::new("reports", "view")].granted);
        assert!(
            effective.contains_key(&PermissionKey::new("reports", "export")),
            "add mode must not touch unrelated rows"
        );
    }

    #[test]
    fn test_template_replace_removes_unrelated_rows() {
        // Scenario: the Viewer template applied in replace mode deletes
        // the unrelated export assignment.
        let mut fx = Fixture::new();
        let eng = fx.department("Eng", None);
        let view = fx.permission("reports", "view", Category::General);
        let export = fx.permission("reports", "export", Category::Business);
        fx.assign(eng, export, true, 10);

        let snapshot = fx.snapshot();
        let template_id = uuid::Uuid::new_v4();
        let items = vec![TemplateItem {
            id: uuid::Uuid::new_v4(),
            template_id,
            permission_id: view,
            granted: true,
            priority: 0,
            inherit_from_parent: true,
            override_children: false,
        }];
        let current = snapshot.direct_rows(eng).to_vec();
        let plan = plan_template(
            &snapshot,
            eng,
            template_id,
            &items,
            &current,
            ApplyMode::Replace,
        )
        .unwrap();

        let after = reapply(&snapshot, apply(&snapshot, &plan.mutations));
        let effective = resolve_effective(&after, eng).unwrap();
        assert!(effective[&PermissionKey::new("reports", "view")].granted);
        assert!(
            !effective.contains_key(&PermissionKey::new("reports", "export")),
            "replace mode must delete rows outside the template"
        );
    }

    #[test]
    fn test_template_rejects_unknown_permission() {
        let mut fx = Fixture::new();
        let eng = fx.department("Eng", None);
        fx.permission("reports", "view", Category::General);

        let snapshot = fx.snapshot();
        let template_id = uuid::Uuid::new_v4();
        let items = vec![TemplateItem {
            id: uuid::Uuid::new_v4(),
            template_id,
            permission_id: uuid::Uuid::new_v4(),
            granted: true,
            priority: 0,
            inherit_from_parent: true,
            override_children: false,
        }];
        let err = plan_template(&snapshot, eng, template_id, &items, &[], ApplyMode::Add)
            .unwrap_err();
        assert_eq!(err.kind, orgperm_core::error::ErrorKind::NotFound);
    }
}
