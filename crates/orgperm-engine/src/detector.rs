//! Conflict detection.
//!
//! Classifies disagreements among the assignments visible to a
//! department. Works on the same candidate view as the resolver, before
//! it collapses each pair to a single winner.

use uuid::Uuid;

use orgperm_core::AppResult;
use orgperm_entity::conflict::{Conflict, ConflictSeverity, ConflictType};
use orgperm_entity::permission::PermissionCategory;

use crate::candidates::{self, Candidate, PairCandidates};
use crate::resolver;
use crate::snapshot::Snapshot;

/// Detect every conflict visible to one department.
pub fn detect_conflicts(snapshot: &Snapshot, department_id: Uuid) -> AppResult<Vec<Conflict>> {
    let pairs = candidates::gather(snapshot, department_id)?;

    let mut conflicts = Vec::new();
    for (key, pair) in pairs {
        classify_pair(snapshot, department_id, &key.resource, &key.action, &pair, &mut conflicts);
    }
    Ok(conflicts)
}

/// Detect conflicts across every department in the tree.
///
/// Duplicates are reported only at the department that owns the twin
/// rows, so a global sweep reports each conflict exactly once.
pub fn detect_all_conflicts(snapshot: &Snapshot) -> AppResult<Vec<Conflict>> {
    let mut conflicts = Vec::new();
    for department_id in snapshot.tree.department_ids() {
        conflicts.extend(detect_conflicts(snapshot, department_id)?);
    }
    Ok(conflicts)
}

fn classify_pair(
    snapshot: &Snapshot,
    department_id: Uuid,
    resource: &str,
    action: &str,
    pair: &PairCandidates<'_>,
    out: &mut Vec<Conflict>,
) {
    // Same-level twins: a write-path bug or race. Surfaced, never
    // silently picked from, never auto-resolved.
    if !pair.duplicates.is_empty() {
        out.push(Conflict {
            id: Conflict::deterministic_id(department_id, resource, action, ConflictType::Duplicate),
            conflict_type: ConflictType::Duplicate,
            severity: ConflictSeverity::Critical,
            department_id,
            resource: resource.to_string(),
            action: action.to_string(),
            conflicting_assignments: pair.duplicates.iter().map(|r| (*r).clone()).collect(),
            auto_resolvable: false,
        });
    }

    let Some(direct) = pair.direct() else {
        return;
    };
    let upstream: Vec<Candidate<'_>> = pair.inherited().copied().collect();
    let Some(inherited_winner) = resolver::winner(&upstream) else {
        return;
    };

    if direct.assignment.granted == inherited_winner.assignment.granted {
        // The direct row restates what inheritance already produces.
        out.push(Conflict {
            id: Conflict::deterministic_id(department_id, resource, action, ConflictType::Redundant),
            conflict_type: ConflictType::Redundant,
            severity: ConflictSeverity::Low,
            department_id,
            resource: resource.to_string(),
            action: action.to_string(),
            conflicting_assignments: vec![
                direct.assignment.clone(),
                inherited_winner.assignment.clone(),
            ],
            auto_resolvable: true,
        });
        return;
    }

    // A granted disagreement is only a live conflict when the ancestor
    // has not locked the pair down: with override_children the ancestor
    // decides alone and the rows do not compete.
    if inherited_winner.assignment.override_children {
        return;
    }

    let mut involved = vec![direct.assignment.clone()];
    involved.extend(upstream.iter().map(|c| c.assignment.clone()));

    out.push(Conflict {
        id: Conflict::deterministic_id(
            department_id,
            resource,
            action,
            ConflictType::Contradictory,
        ),
        conflict_type: ConflictType::Contradictory,
        severity: contradictory_severity(snapshot, pair, upstream.len()),
        department_id,
        resource: resource.to_string(),
        action: action.to_string(),
        conflicting_assignments: involved,
        auto_resolvable: direct.assignment.priority != inherited_winner.assignment.priority,
    });
}

/// Severity scales with the reach of the disagreement: critical-category
/// permissions always escalate, and disagreements spanning several
/// ancestor levels outrank single-level ones.
fn contradictory_severity(
    snapshot: &Snapshot,
    pair: &PairCandidates<'_>,
    ancestor_levels: usize,
) -> ConflictSeverity {
    let category = snapshot
        .permission(pair.permission_id)
        .map(|p| p.category);
    if category == Some(PermissionCategory::Critical) {
        return ConflictSeverity::Critical;
    }
    if ancestor_levels >= 2 {
        ConflictSeverity::High
    } else {
        ConflictSeverity::Medium
    }
}
