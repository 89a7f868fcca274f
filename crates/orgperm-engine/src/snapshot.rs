//! Consistent input snapshot for the pure engine.

use std::collections::HashMap;

use uuid::Uuid;

use orgperm_entity::assignment::PermissionAssignment;
use orgperm_entity::effective::PermissionKey;
use orgperm_entity::permission::Permission;

use crate::hierarchy::DepartmentTree;

/// Everything the resolver and detector need: the department tree, the
/// permission catalog, and the direct assignment rows per department.
///
/// Built by the service layer from one consistent read of the store;
/// the engine itself never touches the store.
#[derive(Debug, Clone)]
pub struct Snapshot {
    /// Validated department tree.
    pub tree: DepartmentTree,
    /// Permission catalog indexed by id.
    pub catalog: HashMap<Uuid, Permission>,
    /// Direct assignment rows keyed by department id.
    pub assignments: HashMap<Uuid, Vec<PermissionAssignment>>,
}

impl Snapshot {
    /// Create a snapshot from its parts.
    pub fn new(
        tree: DepartmentTree,
        catalog: Vec<Permission>,
        assignments: Vec<PermissionAssignment>,
    ) -> Self {
        let catalog = catalog.into_iter().map(|p| (p.id, p)).collect();
        let mut by_department: HashMap<Uuid, Vec<PermissionAssignment>> = HashMap::new();
        for row in assignments {
            by_department.entry(row.department_id).or_default().push(row);
        }
        Self {
            tree,
            catalog,
            assignments: by_department,
        }
    }

    /// Direct rows stored at one department.
    pub fn direct_rows(&self, department_id: Uuid) -> &[PermissionAssignment] {
        self.assignments
            .get(&department_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Catalog lookup by permission id.
    pub fn permission(&self, permission_id: Uuid) -> Option<&Permission> {
        self.catalog.get(&permission_id)
    }

    /// The `(resource, action)` key of an assignment, if its permission
    /// is known to the catalog.
    pub fn key_of(&self, assignment: &PermissionAssignment) -> Option<PermissionKey> {
        self.permission(assignment.permission_id)
            .map(|p| PermissionKey::new(p.resource.clone(), p.action.clone()))
    }
}
