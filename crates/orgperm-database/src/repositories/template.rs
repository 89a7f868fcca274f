//! Permission template repository implementation.

use sqlx::PgPool;
use uuid::Uuid;

use orgperm_core::error::{AppError, ErrorKind};
use orgperm_core::result::AppResult;
use orgperm_entity::template::{PermissionTemplate, TemplateItem};

/// Repository for permission templates and their items.
#[derive(Debug, Clone)]
pub struct TemplateRepository {
    pool: PgPool,
}

impl TemplateRepository {
    /// Create a new template repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a template by ID.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<PermissionTemplate>> {
        sqlx::query_as::<_, PermissionTemplate>(
            "SELECT * FROM permission_templates WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::StorageUnavailable, "Failed to find template", e)
        })
    }

    /// Fetch all templates, ordered by name.
    pub async fn find_all(&self) -> AppResult<Vec<PermissionTemplate>> {
        sqlx::query_as::<_, PermissionTemplate>(
            "SELECT * FROM permission_templates ORDER BY name ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::StorageUnavailable, "Failed to list templates", e)
        })
    }

    /// Fetch the items of one template in a stable order.
    pub async fn find_items(&self, template_id: Uuid) -> AppResult<Vec<TemplateItem>> {
        sqlx::query_as::<_, TemplateItem>(
            "SELECT * FROM permission_template_items \
             WHERE template_id = $1 ORDER BY id ASC",
        )
        .bind(template_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::StorageUnavailable, "Failed to list template items", e)
        })
    }
}
