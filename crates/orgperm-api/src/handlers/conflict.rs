//! Conflict detection and resolution handlers.

use axum::Json;
use axum::extract::{Path, State};
use uuid::Uuid;
use validator::Validate;

use orgperm_core::error::AppError;
use orgperm_service::conflict::{
    AutoResolveOutcome, ResolutionOutcome, ResolveConflictRequest,
};

use crate::dto::request::{AutoResolveBody, ResolveConflictBody};
use crate::dto::response::{ApiResponse, ConflictListResponse};
use crate::error::ApiError;
use crate::extractors::Operator;
use crate::state::AppState;

/// GET /api/departments/{id}/conflicts
pub async fn list_department_conflicts(
    State(state): State<AppState>,
    Path(department_id): Path<Uuid>,
) -> Result<Json<ApiResponse<ConflictListResponse>>, ApiError> {
    let conflicts = state.resolution_service.conflicts_for(department_id).await?;
    let count = conflicts.len();
    Ok(Json(ApiResponse::ok(ConflictListResponse {
        conflicts,
        count,
    })))
}

/// GET /api/conflicts
pub async fn list_all_conflicts(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<ConflictListResponse>>, ApiError> {
    let conflicts = state.resolution_service.conflicts_global().await?;
    let count = conflicts.len();
    Ok(Json(ApiResponse::ok(ConflictListResponse {
        conflicts,
        count,
    })))
}

/// POST /api/conflicts/{id}/resolve
pub async fn resolve_conflict(
    State(state): State<AppState>,
    operator: Operator,
    Path(conflict_id): Path<Uuid>,
    Json(body): Json<ResolveConflictBody>,
) -> Result<Json<ApiResponse<ResolutionOutcome>>, ApiError> {
    body.validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let outcome = state
        .conflict_service
        .resolve(
            operator.context(),
            conflict_id,
            ResolveConflictRequest {
                strategy: body.strategy,
                manual_target: body.manual_target,
                cascade_to_children: body.cascade_to_children,
                reason: body.reason,
            },
        )
        .await?;
    Ok(Json(ApiResponse::ok(outcome)))
}

/// POST /api/conflicts/auto-resolve
pub async fn auto_resolve_conflicts(
    State(state): State<AppState>,
    operator: Operator,
    Json(body): Json<AutoResolveBody>,
) -> Result<Json<ApiResponse<AutoResolveOutcome>>, ApiError> {
    body.validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let outcome = state
        .conflict_service
        .auto_resolve(operator.context(), body.conflict_ids, body.reason)
        .await?;
    Ok(Json(ApiResponse::ok(outcome)))
}
