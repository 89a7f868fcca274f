//! `Operator` extractor that pulls the operator identity headers supplied
//! by the external authentication collaborator.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use uuid::Uuid;

use orgperm_core::error::AppError;
use orgperm_service::context::OperatorContext;

use crate::error::ApiError;

/// Header carrying the operator's id (required on write routes).
pub const OPERATOR_ID_HEADER: &str = "x-operator-id";
/// Header carrying the operator's display name (optional).
pub const OPERATOR_NAME_HEADER: &str = "x-operator-name";

/// Extracted operator context available in write handlers.
#[derive(Debug, Clone)]
pub struct Operator(pub OperatorContext);

impl Operator {
    /// Returns the inner `OperatorContext`.
    pub fn context(&self) -> &OperatorContext {
        &self.0
    }
}

impl std::ops::Deref for Operator {
    type Target = OperatorContext;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S: Send + Sync> FromRequestParts<S> for Operator {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(OPERATOR_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::validation("Missing X-Operator-Id header"))?;

        let operator_id = Uuid::parse_str(raw).map_err(|_| {
            AppError::validation(format!("X-Operator-Id is not a valid uuid: '{raw}'"))
        })?;

        let operator_name = parts
            .headers
            .get(OPERATOR_NAME_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(String::from);

        Ok(Operator(OperatorContext::new(operator_id, operator_name)))
    }
}
