//! Route definitions for the OrgPerm HTTP API.
//!
//! All routes are organized by domain and mounted under `/api`. The
//! router receives `AppState` and passes it to all handlers via Axum's
//! `State` extractor.

use axum::{
    Router,
    routing::{delete, get, post},
};
use axum::http::HeaderValue;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(department_routes())
        .merge(permission_routes())
        .merge(conflict_routes())
        .merge(template_routes())
        .merge(history_routes())
        .merge(health_routes());

    let cors = build_cors_layer(&state);

    Router::new()
        .nest("/api", api_routes)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Department reads, effective permissions, scoped conflicts, and
/// direct assignment writes.
fn department_routes() -> Router<AppState> {
    Router::new()
        .route("/departments", get(handlers::department::list_departments))
        .route("/departments/{id}", get(handlers::department::get_department))
        .route(
            "/departments/{id}/effective-permissions",
            get(handlers::effective::get_effective_permissions),
        )
        .route(
            "/departments/{id}/conflicts",
            get(handlers::conflict::list_department_conflicts),
        )
        .route(
            "/departments/{id}/permissions",
            post(handlers::assignment::assign_permission),
        )
        .route(
            "/departments/{id}/permissions/{permission_id}",
            delete(handlers::assignment::revoke_permission),
        )
}

/// Permission catalog reads.
fn permission_routes() -> Router<AppState> {
    Router::new().route("/permissions", get(handlers::permission::list_permissions))
}

/// Global conflict detection and resolution.
fn conflict_routes() -> Router<AppState> {
    Router::new()
        .route("/conflicts", get(handlers::conflict::list_all_conflicts))
        .route(
            "/conflicts/{id}/resolve",
            post(handlers::conflict::resolve_conflict),
        )
        .route(
            "/conflicts/auto-resolve",
            post(handlers::conflict::auto_resolve_conflicts),
        )
}

/// Template reads and application.
fn template_routes() -> Router<AppState> {
    Router::new()
        .route("/templates", get(handlers::template::list_templates))
        .route("/templates/{id}", get(handlers::template::get_template))
        .route("/templates/{id}/apply", post(handlers::template::apply_template))
}

/// History queries and retention.
fn history_routes() -> Router<AppState> {
    Router::new()
        .route("/history", get(handlers::history::query_history))
        .route("/history/purge", post(handlers::history::purge_history))
}

/// Health check.
fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}

/// CORS layer from configuration; an empty origin list allows any.
fn build_cors_layer(state: &AppState) -> CorsLayer {
    let origins = &state.config.server.cors_allowed_origins;
    if origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let parsed: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(parsed)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}
