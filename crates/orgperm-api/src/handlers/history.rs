//! History handlers.

use std::str::FromStr;

use axum::Json;
use axum::extract::{Query, State};

use orgperm_core::types::pagination::PageResponse;
use orgperm_database::repositories::HistoryFilter;
use orgperm_entity::history::{HistoryEntry, OperationType};

use crate::dto::request::{HistoryQueryParams, PurgeHistoryBody};
use crate::dto::response::{ApiResponse, PurgeHistoryResponse};
use crate::error::ApiError;
use crate::extractors::{Operator, PaginationParams};
use crate::state::AppState;

/// GET /api/history
pub async fn query_history(
    State(state): State<AppState>,
    Query(params): Query<HistoryQueryParams>,
    Query(page): Query<PaginationParams>,
) -> Result<Json<ApiResponse<PageResponse<HistoryEntry>>>, ApiError> {
    let operation_type = params
        .operation_type
        .as_deref()
        .map(OperationType::from_str)
        .transpose()?;

    let filter = HistoryFilter {
        department_id: params.department_id,
        operator_id: params.operator_id,
        operation_type,
        permission_id: params.permission_id,
        from: params.from,
        to: params.to,
        text: params.q,
    };

    let result = state
        .history_service
        .query(&filter, &page.into_page_request())
        .await?;
    Ok(Json(ApiResponse::ok(result)))
}

/// POST /api/history/purge
pub async fn purge_history(
    State(state): State<AppState>,
    operator: Operator,
    Json(body): Json<PurgeHistoryBody>,
) -> Result<Json<ApiResponse<PurgeHistoryResponse>>, ApiError> {
    let purged = state
        .history_service
        .purge(operator.context(), body.older_than_days)
        .await?;
    Ok(Json(ApiResponse::ok(PurgeHistoryResponse { purged })))
}
