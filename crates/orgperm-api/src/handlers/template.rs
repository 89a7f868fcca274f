//! Template handlers.

use axum::Json;
use axum::extract::{Path, State};
use uuid::Uuid;
use validator::Validate;

use orgperm_core::error::AppError;
use orgperm_entity::template::PermissionTemplate;
use orgperm_service::template::{ApplyTemplateRequest, TemplateApplyOutcome};

use crate::dto::request::ApplyTemplateBody;
use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::extractors::Operator;
use crate::state::AppState;

/// GET /api/templates
pub async fn list_templates(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<PermissionTemplate>>>, ApiError> {
    let templates = state.template_service.list().await?;
    Ok(Json(ApiResponse::ok(templates)))
}

/// GET /api/templates/{id}
pub async fn get_template(
    State(state): State<AppState>,
    Path(template_id): Path<Uuid>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let (template, items) = state.template_service.get(template_id).await?;
    Ok(Json(ApiResponse::ok(serde_json::json!({
        "template": template,
        "items": items,
    }))))
}

/// POST /api/templates/{id}/apply
pub async fn apply_template(
    State(state): State<AppState>,
    operator: Operator,
    Path(template_id): Path<Uuid>,
    Json(body): Json<ApplyTemplateBody>,
) -> Result<Json<ApiResponse<TemplateApplyOutcome>>, ApiError> {
    body.validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let outcome = state
        .template_service
        .apply(
            operator.context(),
            template_id,
            ApplyTemplateRequest {
                department_ids: body.department_ids,
                mode: body.mode,
                reason: body.reason,
            },
        )
        .await?;
    Ok(Json(ApiResponse::ok(outcome)))
}
