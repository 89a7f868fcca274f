//! Per-pair candidate gathering along the ancestor chain.
//!
//! Both the resolver and the detector consume the same candidate view,
//! so the effective value and the conflicts reported for it can never
//! disagree about which assignments are in play.

use std::collections::{BTreeMap, HashSet};

use uuid::Uuid;

use orgperm_core::AppResult;
use orgperm_entity::assignment::PermissionAssignment;
use orgperm_entity::effective::PermissionKey;

use crate::snapshot::Snapshot;

/// One direct assignment visible on the chain.
#[derive(Debug, Clone, Copy)]
pub struct Candidate<'a> {
    /// The direct row.
    pub assignment: &'a PermissionAssignment,
    /// Levels between the target department and the row's department
    /// (0 = the row lives at the target itself).
    pub distance: usize,
}

/// Every candidate visible to the target department for one pair.
#[derive(Debug, Clone)]
pub struct PairCandidates<'a> {
    /// Catalog permission all candidates refer to.
    pub permission_id: Uuid,
    /// Candidates ordered nearest-first (ascending distance), at most
    /// one per level.
    pub candidates: Vec<Candidate<'a>>,
    /// Extra rows found at the target level itself when more than one
    /// direct row exists for the pair. A write-path invariant violation
    /// that must be surfaced, never silently picked from.
    pub duplicates: Vec<&'a PermissionAssignment>,
}

impl<'a> PairCandidates<'a> {
    /// The candidate stored at the target department, if any.
    pub fn direct(&self) -> Option<&Candidate<'a>> {
        self.candidates.first().filter(|c| c.distance == 0)
    }

    /// Candidates above the target department, nearest-first.
    pub fn inherited(&self) -> impl Iterator<Item = &Candidate<'a>> {
        self.candidates.iter().filter(|c| c.distance > 0)
    }
}

/// Gather the candidate chains for every `(resource, action)` pair
/// observed anywhere on the target's ancestor chain.
///
/// The walk climbs from the target toward the root and, per pair, stops
/// climbing above the first level whose direct row sets
/// `inherit_from_parent = false` (levels without a row inherit by
/// default).
pub fn gather<'a>(
    snapshot: &'a Snapshot,
    department_id: Uuid,
) -> AppResult<BTreeMap<PermissionKey, PairCandidates<'a>>> {
    let chain = snapshot.tree.ancestor_chain(department_id)?;

    let mut pairs: BTreeMap<PermissionKey, PairCandidates<'a>> = BTreeMap::new();
    let mut stopped: HashSet<PermissionKey> = HashSet::new();

    for (distance, level_id) in chain.iter().rev().enumerate() {
        let mut by_key: BTreeMap<PermissionKey, Vec<&'a PermissionAssignment>> = BTreeMap::new();
        for row in snapshot.direct_rows(*level_id) {
            let Some(key) = snapshot.key_of(row) else {
                // Row references a permission missing from the catalog
                // snapshot; foreign keys make this unreachable in
                // practice, and an unknown pair cannot be resolved.
                continue;
            };
            by_key.entry(key).or_default().push(row);
        }

        for (key, mut rows) in by_key {
            if stopped.contains(&key) {
                continue;
            }
            // Deterministic representative when duplicates exist:
            // highest priority, then oldest row.
            rows.sort_by(|a, b| {
                b.priority
                    .cmp(&a.priority)
                    .then(a.created_at.cmp(&b.created_at))
                    .then(a.id.cmp(&b.id))
            });
            let representative = rows[0];

            let entry = pairs
                .entry(key.clone())
                .or_insert_with(|| PairCandidates {
                    permission_id: representative.permission_id,
                    candidates: Vec::new(),
                    duplicates: Vec::new(),
                });
            if distance == 0 && rows.len() > 1 {
                entry.duplicates = rows.clone();
            }
            entry.candidates.push(Candidate {
                assignment: representative,
                distance,
            });
            if !representative.inherit_from_parent {
                stopped.insert(key);
            }
        }
    }

    Ok(pairs)
}
