//! Department hierarchy store.
//!
//! Wraps the externally-managed department rows in a validated tree.
//! Construction rejects dangling or cyclic parent references; lookups
//! use the materialized `path` so ancestor resolution is O(depth) and
//! subtree walks use an explicit stack, never unbounded recursion.

use std::collections::HashMap;

use uuid::Uuid;

use orgperm_core::{AppError, AppResult};
use orgperm_entity::department::Department;

/// A validated, read-only department tree.
#[derive(Debug, Clone)]
pub struct DepartmentTree {
    departments: HashMap<Uuid, Department>,
    /// Child ids per parent, sorted ascending for deterministic walks.
    children: HashMap<Uuid, Vec<Uuid>>,
    /// Root department ids, sorted ascending.
    roots: Vec<Uuid>,
}

impl DepartmentTree {
    /// Build a tree from department rows, validating hierarchy invariants.
    ///
    /// Rejected with `InvalidHierarchy`: duplicate ids, a `parent_id`
    /// pointing at a missing department, and any row whose materialized
    /// `path`/`level` disagrees with its parent's. Because a valid path
    /// strictly extends the parent's path, cycles cannot pass validation.
    pub fn build(rows: Vec<Department>) -> AppResult<Self> {
        let mut departments: HashMap<Uuid, Department> = HashMap::with_capacity(rows.len());
        for dept in rows {
            if departments.insert(dept.id, dept).is_some() {
                return Err(AppError::invalid_hierarchy("Duplicate department id"));
            }
        }

        let mut children: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
        let mut roots = Vec::new();

        for dept in departments.values() {
            if !dept.path_is_consistent() {
                return Err(AppError::invalid_hierarchy(format!(
                    "Department {} has an inconsistent path/level",
                    dept.id
                )));
            }
            match dept.parent_id {
                Some(parent_id) => {
                    let parent = departments.get(&parent_id).ok_or_else(|| {
                        AppError::invalid_hierarchy(format!(
                            "Department {} references missing parent {parent_id}",
                            dept.id
                        ))
                    })?;
                    if dept.level != parent.level + 1
                        || dept.path[..dept.path.len() - 1] != parent.path[..]
                    {
                        return Err(AppError::invalid_hierarchy(format!(
                            "Department {} does not extend its parent's path",
                            dept.id
                        )));
                    }
                    children.entry(parent_id).or_default().push(dept.id);
                }
                None => {
                    if dept.level != 0 {
                        return Err(AppError::invalid_hierarchy(format!(
                            "Root department {} has non-zero level",
                            dept.id
                        )));
                    }
                    roots.push(dept.id);
                }
            }
        }

        for ids in children.values_mut() {
            ids.sort_unstable();
        }
        roots.sort_unstable();

        Ok(Self {
            departments,
            children,
            roots,
        })
    }

    /// Look up a department by id.
    pub fn get(&self, id: Uuid) -> Option<&Department> {
        self.departments.get(&id)
    }

    /// Whether the given department exists.
    pub fn contains(&self, id: Uuid) -> bool {
        self.departments.contains_key(&id)
    }

    /// Number of departments in the tree.
    pub fn len(&self) -> usize {
        self.departments.len()
    }

    /// Whether the tree is empty.
    pub fn is_empty(&self) -> bool {
        self.departments.is_empty()
    }

    /// All department ids, sorted ascending.
    pub fn department_ids(&self) -> Vec<Uuid> {
        let mut ids: Vec<Uuid> = self.departments.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Root department ids, sorted ascending.
    pub fn roots(&self) -> &[Uuid] {
        &self.roots
    }

    /// Direct children of a department, sorted ascending.
    pub fn children(&self, id: Uuid) -> &[Uuid] {
        self.children.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The ordered ancestor chain `[root, …, id]`, straight from the
    /// materialized path.
    pub fn ancestor_chain(&self, id: Uuid) -> AppResult<&[Uuid]> {
        let dept = self
            .departments
            .get(&id)
            .ok_or_else(|| AppError::not_found(format!("Department {id} not found")))?;
        Ok(&dept.path)
    }

    /// All descendant ids of a department (excluding itself), via an
    /// iterative stack walk in deterministic order.
    pub fn descendants(&self, id: Uuid) -> AppResult<Vec<Uuid>> {
        if !self.contains(id) {
            return Err(AppError::not_found(format!("Department {id} not found")));
        }
        Ok(self.descendants_pruned(id, |_| false))
    }

    /// Descendants of `id`, skipping the entire subtree under any
    /// department for which `prune` returns true (the pruned department
    /// itself is also excluded).
    pub fn descendants_pruned(&self, id: Uuid, prune: impl Fn(Uuid) -> bool) -> Vec<Uuid> {
        let mut result = Vec::new();
        let mut stack: Vec<Uuid> = self.children(id).to_vec();
        while let Some(current) = stack.pop() {
            if prune(current) {
                continue;
            }
            result.push(current);
            stack.extend_from_slice(self.children(current));
        }
        result.sort_unstable();
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn dept(id: Uuid, parent: Option<&Department>) -> Department {
        let (parent_id, path, level) = match parent {
            Some(p) => {
                let mut path = p.path.clone();
                path.push(id);
                (Some(p.id), path, p.level + 1)
            }
            None => (None, vec![id], 0),
        };
        Department {
            id,
            parent_id,
            name: format!("dept-{id}"),
            path,
            level,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn id(n: u128) -> Uuid {
        Uuid::from_u128(n)
    }

    #[test]
    fn test_build_and_walk() {
        let root = dept(id(1), None);
        let a = dept(id(2), Some(&root));
        let b = dept(id(3), Some(&root));
        let a1 = dept(id(4), Some(&a));

        let tree = DepartmentTree::build(vec![root, a.clone(), b, a1]).unwrap();
        assert_eq!(tree.len(), 4);
        assert_eq!(tree.ancestor_chain(id(4)).unwrap(), &[id(1), id(2), id(4)]);
        assert_eq!(tree.descendants(id(1)).unwrap(), vec![id(2), id(3), id(4)]);
        assert_eq!(tree.descendants(id(2)).unwrap(), vec![id(4)]);
        assert_eq!(tree.roots(), &[id(1)]);
    }

    #[test]
    fn test_missing_parent_rejected() {
        let root = dept(id(1), None);
        let mut orphan = dept(id(2), Some(&root));
        orphan.parent_id = Some(id(99));
        orphan.path = vec![id(99), id(2)];

        let err = DepartmentTree::build(vec![root, orphan]).unwrap_err();
        assert_eq!(err.kind, orgperm_core::error::ErrorKind::InvalidHierarchy);
    }

    #[test]
    fn test_cycle_rejected() {
        // Two departments claiming each other as parent cannot produce
        // consistent paths; validation must refuse them.
        let now = Utc::now();
        let a = Department {
            id: id(1),
            parent_id: Some(id(2)),
            name: "a".into(),
            path: vec![id(2), id(1)],
            level: 1,
            created_at: now,
            updated_at: now,
        };
        let b = Department {
            id: id(2),
            parent_id: Some(id(1)),
            name: "b".into(),
            path: vec![id(1), id(2)],
            level: 1,
            created_at: now,
            updated_at: now,
        };
        let err = DepartmentTree::build(vec![a, b]).unwrap_err();
        assert_eq!(err.kind, orgperm_core::error::ErrorKind::InvalidHierarchy);
    }

    #[test]
    fn test_inconsistent_path_rejected() {
        let root = dept(id(1), None);
        let mut child = dept(id(2), Some(&root));
        child.level = 5;

        let err = DepartmentTree::build(vec![root, child]).unwrap_err();
        assert_eq!(err.kind, orgperm_core::error::ErrorKind::InvalidHierarchy);
    }

    #[test]
    fn test_descendants_pruned_skips_subtree() {
        let root = dept(id(1), None);
        let a = dept(id(2), Some(&root));
        let a1 = dept(id(4), Some(&a));
        let b = dept(id(3), Some(&root));

        let tree = DepartmentTree::build(vec![root, a, a1, b]).unwrap();
        let kept = tree.descendants_pruned(id(1), |d| d == id(2));
        assert_eq!(kept, vec![id(3)]);
    }
}
