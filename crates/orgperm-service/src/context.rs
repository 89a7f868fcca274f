//! Operator context carried through every write operation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identity of the administrator performing a mutation.
///
/// Authentication lives in an external collaborator; the identity
/// arrives as explicit request headers and is never inferred from
/// ambient state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperatorContext {
    /// The operator's ID.
    pub operator_id: Uuid,
    /// The operator's display name, if supplied.
    pub operator_name: Option<String>,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl OperatorContext {
    /// Creates a new operator context.
    pub fn new(operator_id: Uuid, operator_name: Option<String>) -> Self {
        Self {
            operator_id,
            operator_name,
            request_time: Utc::now(),
        }
    }
}
