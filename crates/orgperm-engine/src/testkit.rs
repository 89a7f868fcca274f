//! Shared builders for engine unit tests.

use chrono::{Duration, TimeZone, Utc};
use uuid::Uuid;

use orgperm_entity::assignment::PermissionAssignment;
use orgperm_entity::department::Department;
use orgperm_entity::permission::{Permission, PermissionCategory};

use crate::hierarchy::DepartmentTree;
use crate::snapshot::Snapshot;

pub use orgperm_entity::permission::PermissionCategory as Category;

/// In-memory world builder: departments, catalog, assignment rows.
pub struct Fixture {
    departments: Vec<Department>,
    permissions: Vec<Permission>,
    assignments: Vec<PermissionAssignment>,
    next_id: u128,
}

impl Fixture {
    pub fn new() -> Self {
        Self {
            departments: Vec::new(),
            permissions: Vec::new(),
            assignments: Vec::new(),
            next_id: 1,
        }
    }

    fn next_uuid(&mut self) -> Uuid {
        let id = Uuid::from_u128(self.next_id);
        self.next_id += 1;
        id
    }

    fn timestamp(&self) -> chrono::DateTime<Utc> {
        // Monotonic fake clock so created_at ordering is deterministic.
        Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()
            + Duration::seconds(self.next_id as i64)
    }

    pub fn department(&mut self, name: &str, parent: Option<Uuid>) -> Uuid {
        let id = self.next_uuid();
        let (parent_id, path, level) = match parent {
            Some(pid) => {
                let parent = self
                    .departments
                    .iter()
                    .find(|d| d.id == pid)
                    .expect("parent must be created first");
                let mut path = parent.path.clone();
                path.push(id);
                (Some(pid), path, parent.level + 1)
            }
            None => (None, vec![id], 0),
        };
        let now = self.timestamp();
        self.departments.push(Department {
            id,
            parent_id,
            name: name.to_string(),
            path,
            level,
            created_at: now,
            updated_at: now,
        });
        id
    }

    pub fn permission(
        &mut self,
        resource: &str,
        action: &str,
        category: PermissionCategory,
    ) -> Uuid {
        let id = self.next_uuid();
        self.permissions.push(Permission {
            id,
            resource: resource.to_string(),
            action: action.to_string(),
            category,
            description: None,
            created_at: self.timestamp(),
        });
        id
    }

    /// Direct assignment with default flags (inherit = true, override = false).
    pub fn assign(&mut self, department: Uuid, permission: Uuid, granted: bool, priority: i32) -> Uuid {
        self.assign_with(department, permission, granted, priority, true, false)
    }

    pub fn assign_with(
        &mut self,
        department: Uuid,
        permission: Uuid,
        granted: bool,
        priority: i32,
        inherit_from_parent: bool,
        override_children: bool,
    ) -> Uuid {
        self.assign_full(
            department,
            permission,
            granted,
            priority,
            inherit_from_parent,
            override_children,
            None,
        )
    }

    pub fn assign_full(
        &mut self,
        department: Uuid,
        permission: Uuid,
        granted: bool,
        priority: i32,
        inherit_from_parent: bool,
        override_children: bool,
        conditions: Option<serde_json::Value>,
    ) -> Uuid {
        let id = self.next_uuid();
        let now = self.timestamp();
        self.assignments.push(PermissionAssignment {
            id,
            department_id: department,
            permission_id: permission,
            granted,
            priority,
            inherit_from_parent,
            override_children,
            conditions,
            created_at: now,
            updated_at: now,
        });
        id
    }

    pub fn row(&self, id: Uuid) -> &PermissionAssignment {
        self.assignments
            .iter()
            .find(|a| a.id == id)
            .expect("unknown assignment id")
    }

    pub fn snapshot(&self) -> Snapshot {
        let tree = DepartmentTree::build(self.departments.clone()).expect("fixture tree is valid");
        Snapshot::new(tree, self.permissions.clone(), self.assignments.clone())
    }
}
