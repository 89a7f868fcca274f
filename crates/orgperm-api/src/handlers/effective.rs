//! Effective permission handlers.

use axum::Json;
use axum::extract::{Path, State};
use uuid::Uuid;

use crate::dto::response::{ApiResponse, EffectivePermissionsResponse};
use crate::error::ApiError;
use crate::state::AppState;

/// GET /api/departments/{id}/effective-permissions
pub async fn get_effective_permissions(
    State(state): State<AppState>,
    Path(department_id): Path<Uuid>,
) -> Result<Json<ApiResponse<EffectivePermissionsResponse>>, ApiError> {
    let permissions = state
        .resolution_service
        .effective_permissions(department_id)
        .await?;

    let count = permissions.len();
    Ok(Json(ApiResponse::ok(EffectivePermissionsResponse {
        department_id,
        permissions,
        count,
    })))
}
