//! Effective permission resolution.
//!
//! A pure function from (department, catalog, assignments) to the
//! effective permission set, applying inheritance, override, and
//! priority rules. Identical inputs always produce identical output.

use std::collections::BTreeMap;

use uuid::Uuid;

use orgperm_core::AppResult;
use orgperm_entity::assignment::AssignmentSource;
use orgperm_entity::effective::{EffectiveEntry, EffectivePermissions};

use crate::candidates::{self, Candidate};
use crate::snapshot::Snapshot;

/// Resolve the complete effective permission set for one department.
///
/// Pairs with no surviving candidate are absent from the result:
/// absence is not an explicit deny, and the absent→deny mapping belongs
/// to the consuming authorization check.
pub fn resolve_effective(snapshot: &Snapshot, department_id: Uuid) -> AppResult<EffectivePermissions> {
    let pairs = candidates::gather(snapshot, department_id)?;

    let mut effective: EffectivePermissions = BTreeMap::new();
    for (key, pair) in pairs {
        if let Some(winner) = winner(&pair.candidates) {
            effective.insert(key, to_entry(pair.permission_id, winner));
        }
    }
    Ok(effective)
}

/// Pick the winning candidate for one pair.
///
/// Rules, in order:
/// 1. The nearest ancestor (strictly above the target) whose row sets
///    `override_children = true` is authoritative regardless of
///    priority; nested overrides resolve to the nearest one.
/// 2. Otherwise the highest priority wins; an exact priority tie is
///    broken by proximity to the target (closer wins). Ties at the same
///    level are a write-time invariant violation and never reach here.
pub(crate) fn winner<'a, 'b>(candidates: &'b [Candidate<'a>]) -> Option<&'b Candidate<'a>> {
    if let Some(overriding) = candidates
        .iter()
        .filter(|c| c.distance > 0 && c.assignment.override_children)
        .min_by_key(|c| c.distance)
    {
        return Some(overriding);
    }

    candidates.iter().max_by(|a, b| {
        a.assignment
            .priority
            .cmp(&b.assignment.priority)
            .then(b.distance.cmp(&a.distance))
    })
}

fn to_entry(permission_id: Uuid, winner: &Candidate<'_>) -> EffectiveEntry {
    let inherited = winner.distance > 0;
    EffectiveEntry {
        permission_id,
        granted: winner.assignment.granted,
        source: if inherited {
            AssignmentSource::Inherited
        } else {
            AssignmentSource::Direct
        },
        inherited_from: inherited.then_some(winner.assignment.department_id),
        priority: winner.assignment.priority,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::*;
    use orgperm_entity::effective::PermissionKey;

    #[test]
    fn test_inherited_grant_flows_to_child() {
        // Scenario: Eng (root) grants reports:export, Backend inherits it.
        let mut fx = Fixture::new();
        let eng = fx.department("Eng", None);
        let backend = fx.department("Backend", Some(eng));
        let export = fx.permission("reports", "export", Category::Business);
        fx.assign(eng, export, true, 10);

        let snapshot = fx.snapshot();
        let effective = resolve_effective(&snapshot, backend).unwrap();
        let entry = &effective[&PermissionKey::new("reports", "export")];
        assert!(entry.granted);
        assert_eq!(entry.source, AssignmentSource::Inherited);
        assert_eq!(entry.inherited_from, Some(eng));
        assert_eq!(entry.priority, 10);
    }

    #[test]
    fn test_direct_assignment_is_reported_as_direct() {
        let mut fx = Fixture::new();
        let eng = fx.department("Eng", None);
        let export = fx.permission("reports", "export", Category::Business);
        fx.assign(eng, export, true, 10);

        let snapshot = fx.snapshot();
        let effective = resolve_effective(&snapshot, eng).unwrap();
        let entry = &effective[&PermissionKey::new("reports", "export")];
        assert_eq!(entry.source, AssignmentSource::Direct);
        assert_eq!(entry.inherited_from, None);
    }

    #[test]
    fn test_higher_priority_ancestor_beats_direct() {
        let mut fx = Fixture::new();
        let eng = fx.department("Eng", None);
        let backend = fx.department("Backend", Some(eng));
        let export = fx.permission("reports", "export", Category::Business);
        fx.assign(eng, export, true, 10);
        fx.assign(backend, export, false, 5);

        let snapshot = fx.snapshot();
        let effective = resolve_effective(&snapshot, backend).unwrap();
        let entry = &effective[&PermissionKey::new("reports", "export")];
        assert!(entry.granted, "Eng's priority-10 grant must win over priority 5");
        assert_eq!(entry.inherited_from, Some(eng));
    }

    #[test]
    fn test_priority_tie_broken_by_proximity() {
        let mut fx = Fixture::new();
        let eng = fx.department("Eng", None);
        let backend = fx.department("Backend", Some(eng));
        let export = fx.permission("reports", "export", Category::Business);
        fx.assign(eng, export, true, 10);
        fx.assign(backend, export, false, 10);

        let snapshot = fx.snapshot();
        let effective = resolve_effective(&snapshot, backend).unwrap();
        let entry = &effective[&PermissionKey::new("reports", "export")];
        assert!(!entry.granted, "on a tie the closer assignment wins");
        assert_eq!(entry.source, AssignmentSource::Direct);
    }

    #[test]
    fn test_override_blocks_descendant_priority() {
        let mut fx = Fixture::new();
        let eng = fx.department("Eng", None);
        let backend = fx.department("Backend", Some(eng));
        let export = fx.permission("reports", "export", Category::Business);
        fx.assign_with(eng, export, false, 1, true, true);
        fx.assign(backend, export, true, 100);

        let snapshot = fx.snapshot();
        let effective = resolve_effective(&snapshot, backend).unwrap();
        let entry = &effective[&PermissionKey::new("reports", "export")];
        assert!(
            !entry.granted,
            "override_children must beat any descendant priority"
        );
        assert_eq!(entry.inherited_from, Some(eng));
    }

    #[test]
    fn test_nested_overrides_nearest_wins() {
        let mut fx = Fixture::new();
        let root = fx.department("Root", None);
        let mid = fx.department("Mid", Some(root));
        let leaf = fx.department("Leaf", Some(mid));
        let export = fx.permission("reports", "export", Category::Business);
        fx.assign_with(root, export, false, 50, true, true);
        fx.assign_with(mid, export, true, 1, true, true);

        let snapshot = fx.snapshot();
        let effective = resolve_effective(&snapshot, leaf).unwrap();
        let entry = &effective[&PermissionKey::new("reports", "export")];
        assert!(entry.granted, "the override nearest to the target wins");
        assert_eq!(entry.inherited_from, Some(mid));
    }

    #[test]
    fn test_inherit_false_cuts_the_chain() {
        let mut fx = Fixture::new();
        let root = fx.department("Root", None);
        let mid = fx.department("Mid", Some(root));
        let leaf = fx.department("Leaf", Some(mid));
        let export = fx.permission("reports", "export", Category::Business);
        let view = fx.permission("reports", "view", Category::General);
        fx.assign(root, export, true, 99);
        fx.assign_with(mid, export, false, 1, false, false);
        fx.assign(root, view, true, 1);

        let snapshot = fx.snapshot();
        let effective = resolve_effective(&snapshot, leaf).unwrap();
        let export_entry = &effective[&PermissionKey::new("reports", "export")];
        assert!(
            !export_entry.granted,
            "inherit_from_parent=false at Mid must hide Root's higher-priority grant"
        );
        assert_eq!(export_entry.inherited_from, Some(mid));
        // An unrelated pair still inherits normally.
        assert!(effective[&PermissionKey::new("reports", "view")].granted);
    }

    #[test]
    fn test_absent_pair_is_absent_not_denied() {
        let mut fx = Fixture::new();
        let eng = fx.department("Eng", None);
        let backend = fx.department("Backend", Some(eng));
        fx.permission("reports", "export", Category::Business);

        let snapshot = fx.snapshot();
        let effective = resolve_effective(&snapshot, backend).unwrap();
        assert!(effective.is_empty());
    }

    #[test]
    fn test_inheritance_monotonicity() {
        // With no direct row at the child and inheritance intact along
        // the chain, child and parent resolve identically.
        let mut fx = Fixture::new();
        let root = fx.department("Root", None);
        let mid = fx.department("Mid", Some(root));
        let leaf = fx.department("Leaf", Some(mid));
        let export = fx.permission("reports", "export", Category::Business);
        let view = fx.permission("reports", "view", Category::General);
        fx.assign(root, export, true, 10);
        fx.assign(mid, view, false, 3);

        let snapshot = fx.snapshot();
        let at_leaf = resolve_effective(&snapshot, leaf).unwrap();
        let at_mid = resolve_effective(&snapshot, mid).unwrap();
        for (key, leaf_entry) in &at_leaf {
            let mid_entry = &at_mid[key];
            assert_eq!(leaf_entry.granted, mid_entry.granted);
            assert_eq!(leaf_entry.priority, mid_entry.priority);
        }
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let mut fx = Fixture::new();
        let root = fx.department("Root", None);
        let leaf = fx.department("Leaf", Some(root));
        let export = fx.permission("reports", "export", Category::Business);
        fx.assign(root, export, true, 10);
        fx.assign(leaf, export, false, 5);

        let snapshot = fx.snapshot();
        let first = resolve_effective(&snapshot, leaf).unwrap();
        let second = resolve_effective(&snapshot, leaf).unwrap();
        assert_eq!(first, second);
    }
}
