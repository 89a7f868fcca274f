//! Snapshot loading for the pure engine.

use std::sync::Arc;

use orgperm_core::result::AppResult;
use orgperm_database::repositories::{
    AssignmentRepository, DepartmentRepository, PermissionRepository,
};
use orgperm_engine::{DepartmentTree, Snapshot};

/// Builds engine snapshots from one consistent read of the store.
#[derive(Debug, Clone)]
pub struct SnapshotLoader {
    department_repo: Arc<DepartmentRepository>,
    permission_repo: Arc<PermissionRepository>,
    assignment_repo: Arc<AssignmentRepository>,
}

impl SnapshotLoader {
    /// Creates a new snapshot loader.
    pub fn new(
        department_repo: Arc<DepartmentRepository>,
        permission_repo: Arc<PermissionRepository>,
        assignment_repo: Arc<AssignmentRepository>,
    ) -> Self {
        Self {
            department_repo,
            permission_repo,
            assignment_repo,
        }
    }

    /// Load the tree, catalog, and all direct rows, and validate the
    /// hierarchy. A store whose department rows fail validation is
    /// surfaced as `InvalidHierarchy` rather than silently resolved.
    pub async fn load(&self) -> AppResult<Snapshot> {
        let (departments, permissions, assignments) = tokio::try_join!(
            self.department_repo.find_all(),
            self.permission_repo.find_all(),
            self.assignment_repo.find_all(),
        )?;

        let tree = DepartmentTree::build(departments)?;
        Ok(Snapshot::new(tree, permissions, assignments))
    }
}
