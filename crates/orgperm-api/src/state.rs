//! Application state shared across all handlers.

use std::sync::Arc;

use orgperm_core::config::AppConfig;
use orgperm_database::DatabasePool;
use orgperm_database::repositories::{
    AssignmentRepository, DepartmentRepository, HistoryRepository, PermissionRepository,
    TemplateRepository,
};
use orgperm_service::{
    AssignmentService, ConflictService, DepartmentLocks, HistoryService, ResolutionService,
    SnapshotLoader, TemplateService,
};

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// Database pool wrapper (health checks).
    pub db: DatabasePool,

    // ── Repositories ─────────────────────────────────────────
    /// Department repository.
    pub department_repo: Arc<DepartmentRepository>,
    /// Permission catalog repository.
    pub permission_repo: Arc<PermissionRepository>,
    /// Assignment repository.
    pub assignment_repo: Arc<AssignmentRepository>,
    /// Template repository.
    pub template_repo: Arc<TemplateRepository>,
    /// History repository.
    pub history_repo: Arc<HistoryRepository>,

    // ── Services ─────────────────────────────────────────────
    /// Assign/revoke service.
    pub assignment_service: Arc<AssignmentService>,
    /// Effective permissions and conflict reads.
    pub resolution_service: Arc<ResolutionService>,
    /// Conflict resolution service.
    pub conflict_service: Arc<ConflictService>,
    /// Template application service.
    pub template_service: Arc<TemplateService>,
    /// History query/purge service.
    pub history_service: Arc<HistoryService>,
}

impl AppState {
    /// Wire the full dependency graph from configuration and a
    /// connected pool.
    pub fn new(config: AppConfig, db: DatabasePool) -> Self {
        let pool = db.pool().clone();

        let department_repo = Arc::new(DepartmentRepository::new(pool.clone()));
        let permission_repo = Arc::new(PermissionRepository::new(pool.clone()));
        let assignment_repo = Arc::new(AssignmentRepository::new(pool.clone()));
        let template_repo = Arc::new(TemplateRepository::new(pool.clone()));
        let history_repo = Arc::new(HistoryRepository::new(pool.clone()));

        let locks = Arc::new(DepartmentLocks::new());
        let loader = Arc::new(SnapshotLoader::new(
            department_repo.clone(),
            permission_repo.clone(),
            assignment_repo.clone(),
        ));

        let assignment_service = Arc::new(AssignmentService::new(
            pool.clone(),
            assignment_repo.clone(),
            department_repo.clone(),
            permission_repo.clone(),
            history_repo.clone(),
            locks.clone(),
        ));
        let resolution_service = Arc::new(ResolutionService::new(loader.clone()));
        let conflict_service = Arc::new(ConflictService::new(
            pool.clone(),
            loader.clone(),
            assignment_repo.clone(),
            history_repo.clone(),
            locks.clone(),
        ));
        let template_service = Arc::new(TemplateService::new(
            pool,
            loader,
            template_repo.clone(),
            assignment_repo.clone(),
            history_repo.clone(),
            locks,
        ));
        let history_service = Arc::new(HistoryService::new(
            history_repo.clone(),
            config.history.clone(),
        ));

        Self {
            config: Arc::new(config),
            db,
            department_repo,
            permission_repo,
            assignment_repo,
            template_repo,
            history_repo,
            assignment_service,
            resolution_service,
            conflict_service,
            template_service,
            history_service,
        }
    }
}
