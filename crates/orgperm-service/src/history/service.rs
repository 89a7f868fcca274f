//! Query and purge the permission history log.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::info;

use orgperm_core::config::HistoryConfig;
use orgperm_core::result::AppResult;
use orgperm_core::types::pagination::{PageRequest, PageResponse};
use orgperm_database::repositories::{HistoryFilter, HistoryRepository};
use orgperm_entity::history::HistoryEntry;

use crate::context::OperatorContext;

/// Read and retention operations over the append-only history log.
#[derive(Debug, Clone)]
pub struct HistoryService {
    history_repo: Arc<HistoryRepository>,
    config: HistoryConfig,
}

impl HistoryService {
    /// Creates a new history service.
    pub fn new(history_repo: Arc<HistoryRepository>, config: HistoryConfig) -> Self {
        Self {
            history_repo,
            config,
        }
    }

    /// Search history entries, newest first.
    pub async fn query(
        &self,
        filter: &HistoryFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<HistoryEntry>> {
        self.history_repo.search(filter, page).await
    }

    /// Delete entries older than the given number of days, falling back
    /// to the configured retention when the caller omits it.
    pub async fn purge(
        &self,
        ctx: &OperatorContext,
        older_than_days: Option<u32>,
    ) -> AppResult<u64> {
        let days = older_than_days.unwrap_or(self.config.retention_days);
        let cutoff = Utc::now() - Duration::days(days as i64);
        let purged = self.history_repo.purge_older_than(cutoff).await?;

        info!(
            operator_id = %ctx.operator_id,
            older_than_days = days,
            purged = purged,
            "History purged"
        );
        Ok(purged)
    }
}
