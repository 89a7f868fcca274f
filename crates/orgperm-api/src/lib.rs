//! # orgperm-api
//!
//! HTTP API layer for OrgPerm built on Axum.
//!
//! Provides the REST endpoints, operator-header and pagination
//! extractors, DTOs, and `AppError` → HTTP mapping.

pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod router;
pub mod state;

pub use router::build_router;
pub use state::AppState;
