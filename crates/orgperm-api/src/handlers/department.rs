//! Department read handlers. The hierarchy itself is managed by the
//! upstream organization service.

use axum::Json;
use axum::extract::{Path, State};
use uuid::Uuid;

use orgperm_core::error::AppError;
use orgperm_entity::department::Department;

use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::state::AppState;

/// GET /api/departments
pub async fn list_departments(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<Department>>>, ApiError> {
    let departments = state.department_repo.find_all().await?;
    Ok(Json(ApiResponse::ok(departments)))
}

/// GET /api/departments/{id}
pub async fn get_department(
    State(state): State<AppState>,
    Path(department_id): Path<Uuid>,
) -> Result<Json<ApiResponse<Department>>, ApiError> {
    let department = state
        .department_repo
        .find_by_id(department_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Department {department_id} not found")))?;
    Ok(Json(ApiResponse::ok(department)))
}
