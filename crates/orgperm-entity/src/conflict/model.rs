//! Conflict entity model.
//!
//! Conflicts are derived and ephemeral: recomputed on demand, never
//! persisted. Only their resolution is persisted, as a history entry.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::assignment::PermissionAssignment;

use super::kind::{ConflictSeverity, ConflictType};

/// Namespace for deterministic conflict identifiers.
const CONFLICT_ID_NAMESPACE: Uuid = Uuid::from_u128(0x8f2d_1c64_9a0b_4e7f_b513_2a86_d4f0_91c7);

/// A detected disagreement between assignments visible to one department
/// for one `(resource, action)` pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conflict {
    /// Deterministic identifier, stable across re-detection for the same
    /// (department, resource, action, type) tuple.
    pub id: Uuid,
    /// Classification of the disagreement.
    pub conflict_type: ConflictType,
    /// How urgently the conflict needs attention.
    pub severity: ConflictSeverity,
    /// Department at which the conflict is visible.
    pub department_id: Uuid,
    /// Resource component of the contested pair.
    pub resource: String,
    /// Action component of the contested pair.
    pub action: String,
    /// Snapshots of the assignments involved (at least two).
    pub conflicting_assignments: Vec<PermissionAssignment>,
    /// Whether a deterministic automatic resolution exists.
    pub auto_resolvable: bool,
}

impl Conflict {
    /// Compute the deterministic identifier for a conflict tuple.
    ///
    /// Conflicts are never stored, so the id must be reproducible from
    /// the tuple that defines the conflict; UUIDv5 over a fixed
    /// namespace gives exactly that.
    pub fn deterministic_id(
        department_id: Uuid,
        resource: &str,
        action: &str,
        conflict_type: ConflictType,
    ) -> Uuid {
        // NUL-separated so a separator character inside a resource or
        // action name cannot collide with a different component split.
        let name = format!(
            "{department_id}\0{resource}\0{action}\0{}",
            conflict_type.as_str()
        );
        Uuid::new_v5(&CONFLICT_ID_NAMESPACE, name.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deterministic_id_is_stable() {
        let dept = Uuid::new_v4();
        let a = Conflict::deterministic_id(dept, "reports", "export", ConflictType::Contradictory);
        let b = Conflict::deterministic_id(dept, "reports", "export", ConflictType::Contradictory);
        assert_eq!(a, b);
    }

    #[test]
    fn test_deterministic_id_distinguishes_tuples() {
        let dept = Uuid::new_v4();
        let a = Conflict::deterministic_id(dept, "reports", "export", ConflictType::Contradictory);
        let b = Conflict::deterministic_id(dept, "reports", "export", ConflictType::Redundant);
        let c = Conflict::deterministic_id(dept, "reports", "view", ConflictType::Contradictory);
        assert_ne!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_deterministic_id_unambiguous_component_boundaries() {
        let dept = Uuid::new_v4();
        let a = Conflict::deterministic_id(dept, "reports/export", "run", ConflictType::Redundant);
        let b = Conflict::deterministic_id(dept, "reports", "export/run", ConflictType::Redundant);
        assert_ne!(a, b);
    }
}
