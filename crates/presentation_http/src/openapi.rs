//! OpenAPI documentation
//!
//! The generated document is served as JSON at `/api-docs/openapi.json`.

// utoipa derive expands into code clippy flags
#![allow(clippy::needless_for_each)]

use axum::Json;
use utoipa::OpenApi;

use crate::handlers;

/// OpenAPI documentation for TaskSage
#[derive(OpenApi)]
#[openapi(
    info(
        title = "TaskSage API",
        description = "Task category, priority and tip suggestions with a rule-based fallback",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers((url = "/", description = "Local server")),
    tags(
        (name = "health", description = "Liveness and readiness"),
        (name = "suggestions", description = "Task suggestions and parsing")
    ),
    paths(
        handlers::health::health_check,
        handlers::health::readiness_check,
        handlers::suggestions::suggest,
        handlers::suggestions::parse_task,
        handlers::suggestions::stats,
    ),
    components(schemas(
        handlers::health::HealthResponse,
        handlers::health::ReadinessResponse,
        handlers::health::InferenceStatus,
        handlers::suggestions::SuggestBody,
        handlers::suggestions::SuggestionResponse,
        handlers::suggestions::ParseBody,
        handlers::suggestions::ParsedTaskResponse,
        handlers::suggestions::StatsResponse,
        crate::error::ErrorResponse,
    ))
)]
pub struct ApiDoc;

/// Serve the OpenAPI document
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_all_paths() {
        let doc = ApiDoc::openapi();
        for path in [
            "/health",
            "/ready",
            "/v1/suggestions",
            "/v1/tasks/parse",
            "/v1/suggestions/stats",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
