//! Maps domain `AppError` to HTTP responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use orgperm_core::error::{AppError, ErrorKind};

/// Standard API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// Machine-readable error code.
    pub error: String,
    /// Human-readable message.
    pub message: String,
}

/// Newtype carrying `AppError` across the HTTP boundary, so handlers can
/// use `?` on domain results directly.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = self.0;
        let status = match &err.kind {
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Validation | ErrorKind::InvalidStrategy => StatusCode::BAD_REQUEST,
            ErrorKind::DuplicateAssignment
            | ErrorKind::ConflictNotAutoResolvable
            | ErrorKind::ConcurrentModification => StatusCode::CONFLICT,
            ErrorKind::StorageUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ErrorKind::InvalidHierarchy
            | ErrorKind::Configuration
            | ErrorKind::Serialization
            | ErrorKind::Internal => {
                tracing::error!(kind = %err.kind, error = %err.message, "Internal server error");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = ApiErrorResponse {
            error: err.kind.to_string(),
            message: err.message,
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (AppError::not_found("x"), StatusCode::NOT_FOUND),
            (AppError::validation("x"), StatusCode::BAD_REQUEST),
            (AppError::invalid_strategy("x"), StatusCode::BAD_REQUEST),
            (AppError::duplicate_assignment("x"), StatusCode::CONFLICT),
            (AppError::not_auto_resolvable("x"), StatusCode::CONFLICT),
            (AppError::concurrent_modification("x"), StatusCode::CONFLICT),
            (AppError::storage("x"), StatusCode::SERVICE_UNAVAILABLE),
            (AppError::internal("x"), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, expected) in cases {
            assert_eq!(ApiError(err).into_response().status(), expected);
        }
    }
}
