//! Read-side orchestration: effective permissions and conflict reports.

use std::sync::Arc;

use uuid::Uuid;

use orgperm_core::error::AppError;
use orgperm_core::result::AppResult;
use orgperm_engine::{detect_all_conflicts, detect_conflicts, resolve_effective};
use orgperm_entity::conflict::Conflict;
use orgperm_entity::effective::EffectivePermissions;

use crate::snapshot::SnapshotLoader;

/// Computes effective permissions and detects conflicts over a fresh
/// snapshot of the store. Reads are side-effect free.
#[derive(Debug, Clone)]
pub struct ResolutionService {
    loader: Arc<SnapshotLoader>,
}

impl ResolutionService {
    /// Creates a new resolution service.
    pub fn new(loader: Arc<SnapshotLoader>) -> Self {
        Self { loader }
    }

    /// The complete effective permission set for one department.
    pub async fn effective_permissions(
        &self,
        department_id: Uuid,
    ) -> AppResult<EffectivePermissions> {
        let snapshot = self.loader.load().await?;
        if !snapshot.tree.contains(department_id) {
            return Err(AppError::not_found(format!(
                "Department {department_id} not found"
            )));
        }
        resolve_effective(&snapshot, department_id)
    }

    /// Conflicts visible to one department.
    pub async fn conflicts_for(&self, department_id: Uuid) -> AppResult<Vec<Conflict>> {
        let snapshot = self.loader.load().await?;
        if !snapshot.tree.contains(department_id) {
            return Err(AppError::not_found(format!(
                "Department {department_id} not found"
            )));
        }
        detect_conflicts(&snapshot, department_id)
    }

    /// Conflicts across the whole tree, each reported once.
    pub async fn conflicts_global(&self) -> AppResult<Vec<Conflict>> {
        let snapshot = self.loader.load().await?;
        detect_all_conflicts(&snapshot)
    }
}
