//! Unified application error types for OrgPerm.
//!
//! All crates map their internal errors into [`AppError`] for consistent
//! propagation through the ? operator.

use std::fmt;
use thiserror::Error;

/// Top-level error kind categorization used across the entire application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// The requested department, permission, template, or conflict was not found.
    NotFound,
    /// Input validation failed.
    Validation,
    /// The department tree contains a dangling or cyclic parent reference.
    InvalidHierarchy,
    /// A second direct assignment for the same (department, permission) pair.
    DuplicateAssignment,
    /// Auto-resolution was requested for a conflict that requires manual review.
    ConflictNotAutoResolvable,
    /// Optimistic-lock version mismatch on write; the caller must retry.
    ConcurrentModification,
    /// The chosen resolution strategy does not apply to the conflict.
    InvalidStrategy,
    /// The persistence layer is unreachable or a query failed.
    StorageUnavailable,
    /// A configuration error occurred.
    Configuration,
    /// A serialization/deserialization error occurred.
    Serialization,
    /// An internal server error occurred.
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "NOT_FOUND"),
            Self::Validation => write!(f, "VALIDATION"),
            Self::InvalidHierarchy => write!(f, "INVALID_HIERARCHY"),
            Self::DuplicateAssignment => write!(f, "DUPLICATE_ASSIGNMENT"),
            Self::ConflictNotAutoResolvable => write!(f, "CONFLICT_NOT_AUTO_RESOLVABLE"),
            Self::ConcurrentModification => write!(f, "CONCURRENT_MODIFICATION"),
            Self::InvalidStrategy => write!(f, "INVALID_STRATEGY"),
            Self::StorageUnavailable => write!(f, "STORAGE_UNAVAILABLE"),
            Self::Configuration => write!(f, "CONFIGURATION"),
            Self::Serialization => write!(f, "SERIALIZATION"),
            Self::Internal => write!(f, "INTERNAL"),
        }
    }
}

/// The unified application error used throughout OrgPerm.
///
/// All crate-specific errors are mapped into `AppError` using `From` impls
/// or explicit `.map_err()` calls. This provides a single error type for
/// the entire application boundary.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    /// The category of error.
    pub kind: ErrorKind,
    /// A human-readable error message.
    pub message: String,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new application error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Create a new application error with an underlying cause.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a not-found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Create an invalid-hierarchy error.
    pub fn invalid_hierarchy(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidHierarchy, message)
    }

    /// Create a duplicate-assignment error.
    pub fn duplicate_assignment(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::DuplicateAssignment, message)
    }

    /// Create a not-auto-resolvable error.
    pub fn not_auto_resolvable(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ConflictNotAutoResolvable, message)
    }

    /// Create a concurrent-modification error.
    pub fn concurrent_modification(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ConcurrentModification, message)
    }

    /// Create an invalid-strategy error.
    pub fn invalid_strategy(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidStrategy, message)
    }

    /// Create a storage-unavailable error.
    pub fn storage(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::StorageUnavailable, message)
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }
}

impl Clone for AppError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            source: None,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(
            ErrorKind::Serialization,
            format!("JSON serialization error: {err}"),
            err,
        )
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("Configuration error: {err}"),
            err,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_display_codes() {
        assert_eq!(ErrorKind::InvalidHierarchy.to_string(), "INVALID_HIERARCHY");
        assert_eq!(
            ErrorKind::ConcurrentModification.to_string(),
            "CONCURRENT_MODIFICATION"
        );
    }

    #[test]
    fn test_clone_drops_source() {
        let err = AppError::with_source(
            ErrorKind::StorageUnavailable,
            "query failed",
            std::io::Error::other("boom"),
        );
        let cloned = err.clone();
        assert_eq!(cloned.kind, ErrorKind::StorageUnavailable);
        assert!(cloned.source.is_none());
    }
}
