//! Permission history repository implementation.
//!
//! The history table is append-only. Entries are written inside the same
//! transaction as the mutation they record, so a committed mutation is
//! never missing its history row.

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use orgperm_core::error::{AppError, ErrorKind};
use orgperm_core::result::AppResult;
use orgperm_core::types::pagination::{PageRequest, PageResponse};
use orgperm_entity::history::{HistoryEntry, NewHistoryEntry, OperationType};

/// Search filters for history queries. All fields combine with AND.
#[derive(Debug, Clone, Default)]
pub struct HistoryFilter {
    /// Restrict to one department.
    pub department_id: Option<Uuid>,
    /// Restrict to one operator.
    pub operator_id: Option<Uuid>,
    /// Restrict to one operation type.
    pub operation_type: Option<OperationType>,
    /// Restrict to one catalog permission.
    pub permission_id: Option<Uuid>,
    /// Entries at or after this instant.
    pub from: Option<DateTime<Utc>>,
    /// Entries strictly before this instant.
    pub to: Option<DateTime<Utc>>,
    /// Case-insensitive free text over reason, operator name, the
    /// permission's resource/action, and the template name.
    pub text: Option<String>,
}

/// Repository for permission history entries.
#[derive(Debug, Clone)]
pub struct HistoryRepository {
    pool: PgPool,
}

impl HistoryRepository {
    /// Create a new history repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Append a history entry.
    pub async fn create(&self, data: &NewHistoryEntry) -> AppResult<HistoryEntry> {
        let mut conn = self.pool.acquire().await.map_err(|e| {
            AppError::with_source(ErrorKind::StorageUnavailable, "Failed to acquire connection", e)
        })?;
        self.create_tx(&mut conn, data).await
    }

    /// Append a history entry inside a caller-owned transaction.
    pub async fn create_tx(
        &self,
        conn: &mut PgConnection,
        data: &NewHistoryEntry,
    ) -> AppResult<HistoryEntry> {
        sqlx::query_as::<_, HistoryEntry>(
            "INSERT INTO permission_history \
             (department_id, operator_id, operator_name, operation_type, permission_id, \
              template_id, reason, before_state, after_state) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING *",
        )
        .bind(data.department_id)
        .bind(data.operator_id)
        .bind(&data.operator_name)
        .bind(data.operation_type)
        .bind(data.permission_id)
        .bind(data.template_id)
        .bind(&data.reason)
        .bind(&data.before_state)
        .bind(&data.after_state)
        .fetch_one(&mut *conn)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::StorageUnavailable, "Failed to create history entry", e)
        })
    }

    /// Search history with filters, newest first.
    pub async fn search(
        &self,
        filter: &HistoryFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<HistoryEntry>> {
        let mut conditions = Vec::new();
        let mut param_idx = 1u32;

        if filter.department_id.is_some() {
            conditions.push(format!("h.department_id = ${param_idx}"));
            param_idx += 1;
        }
        if filter.operator_id.is_some() {
            conditions.push(format!("h.operator_id = ${param_idx}"));
            param_idx += 1;
        }
        if filter.operation_type.is_some() {
            conditions.push(format!("h.operation_type = ${param_idx}"));
            param_idx += 1;
        }
        if filter.permission_id.is_some() {
            conditions.push(format!("h.permission_id = ${param_idx}"));
            param_idx += 1;
        }
        if filter.from.is_some() {
            conditions.push(format!("h.created_at >= ${param_idx}"));
            param_idx += 1;
        }
        if filter.to.is_some() {
            conditions.push(format!("h.created_at < ${param_idx}"));
            param_idx += 1;
        }
        if filter.text.is_some() {
            conditions.push(format!(
                "(h.reason ILIKE ${param_idx} OR h.operator_name ILIKE ${param_idx} \
                 OR p.resource ILIKE ${param_idx} OR p.action ILIKE ${param_idx} \
                 OR t.name ILIKE ${param_idx})"
            ));
            param_idx += 1;
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };
        let joins = "FROM permission_history h \
                     LEFT JOIN permissions p ON p.id = h.permission_id \
                     LEFT JOIN permission_templates t ON t.id = h.template_id";

        let count_sql = format!("SELECT COUNT(*) {joins} {where_clause}");
        let select_sql = format!(
            "SELECT h.* {joins} {where_clause} \
             ORDER BY h.created_at DESC LIMIT ${param_idx} OFFSET ${}",
            param_idx + 1
        );

        let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
        let mut select_query = sqlx::query_as::<_, HistoryEntry>(&select_sql);

        if let Some(did) = filter.department_id {
            count_query = count_query.bind(did);
            select_query = select_query.bind(did);
        }
        if let Some(oid) = filter.operator_id {
            count_query = count_query.bind(oid);
            select_query = select_query.bind(oid);
        }
        if let Some(op) = filter.operation_type {
            count_query = count_query.bind(op);
            select_query = select_query.bind(op);
        }
        if let Some(pid) = filter.permission_id {
            count_query = count_query.bind(pid);
            select_query = select_query.bind(pid);
        }
        if let Some(from) = filter.from {
            count_query = count_query.bind(from);
            select_query = select_query.bind(from);
        }
        if let Some(to) = filter.to {
            count_query = count_query.bind(to);
            select_query = select_query.bind(to);
        }
        if let Some(text) = &filter.text {
            let pattern = format!("%{text}%");
            count_query = count_query.bind(pattern.clone());
            select_query = select_query.bind(pattern);
        }

        let total = count_query.fetch_one(&self.pool).await.map_err(|e| {
            AppError::with_source(ErrorKind::StorageUnavailable, "Failed to count history entries", e)
        })?;

        let entries = select_query
            .bind(page.limit() as i64)
            .bind(page.offset() as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::StorageUnavailable, "Failed to search history", e)
            })?;

        Ok(PageResponse::new(
            entries,
            page.page,
            page.page_size,
            total as u64,
        ))
    }

    /// Delete entries created before `cutoff`, returning how many went.
    pub async fn purge_older_than(&self, cutoff: DateTime<Utc>) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM permission_history WHERE created_at < $1")
            .bind(cutoff)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::StorageUnavailable, "Failed to purge history", e)
            })?;
        Ok(result.rows_affected())
    }
}
