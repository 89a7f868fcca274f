//! Direct assignment handlers.

use axum::Json;
use axum::extract::{Path, Query, State};
use uuid::Uuid;
use validator::Validate;

use orgperm_core::error::AppError;
use orgperm_entity::assignment::PermissionAssignment;
use orgperm_service::assignment::AssignPermissionRequest;

use crate::dto::request::{AssignPermissionBody, RevokeParams};
use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::extractors::Operator;
use crate::state::AppState;

/// POST /api/departments/{id}/permissions
pub async fn assign_permission(
    State(state): State<AppState>,
    operator: Operator,
    Path(department_id): Path<Uuid>,
    Json(body): Json<AssignPermissionBody>,
) -> Result<Json<ApiResponse<PermissionAssignment>>, ApiError> {
    body.validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let created = state
        .assignment_service
        .assign(
            operator.context(),
            department_id,
            AssignPermissionRequest {
                permission_id: body.permission_id,
                granted: body.granted,
                priority: body.priority,
                inherit_from_parent: body.inherit_from_parent,
                override_children: body.override_children,
                conditions: body.conditions,
                reason: body.reason,
            },
        )
        .await?;
    Ok(Json(ApiResponse::ok(created)))
}

/// DELETE /api/departments/{id}/permissions/{permission_id}
pub async fn revoke_permission(
    State(state): State<AppState>,
    operator: Operator,
    Path((department_id, permission_id)): Path<(Uuid, Uuid)>,
    Query(params): Query<RevokeParams>,
) -> Result<Json<ApiResponse<PermissionAssignment>>, ApiError> {
    let removed = state
        .assignment_service
        .revoke(operator.context(), department_id, permission_id, params.reason)
        .await?;
    Ok(Json(ApiResponse::ok(removed)))
}
