//! Route definitions

use axum::{
    Router, middleware,
    routing::{get, post},
};
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};

use crate::{handlers, middleware::propagate_request_id, openapi, state::AppState};

/// Create the main router with all routes
///
/// Request ids, tracing and the body size limit are applied here; CORS is
/// added by the binary.
pub fn create_router(state: AppState) -> Router {
    let max_body = state.config.server.max_body_size_bytes;

    Router::new()
        // Health and status endpoints
        .route("/health", get(handlers::health::health_check))
        .route("/ready", get(handlers::health::readiness_check))
        // Suggestion API (v1)
        .route("/v1/suggestions", post(handlers::suggestions::suggest))
        .route("/v1/suggestions/stats", get(handlers::suggestions::stats))
        .route("/v1/tasks/parse", post(handlers::suggestions::parse_task))
        // API docs
        .route("/api-docs/openapi.json", get(openapi::openapi_json))
        .layer(RequestBodyLimitLayer::new(max_body))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(propagate_request_id))
        .with_state(state)
}
