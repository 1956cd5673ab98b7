//! Health check handlers

use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::state::AppState;

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Liveness check - is the server running?
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses((status = 200, description = "Server is running", body = HealthResponse))
)]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Readiness response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReadinessResponse {
    pub ready: bool,
    /// Remote inference is switched off; every answer comes from the rules
    pub fallback_only: bool,
    pub inference: InferenceStatus,
}

/// Status of the remote inference backend
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct InferenceStatus {
    pub provider: String,
    pub healthy: bool,
    pub model: Option<String>,
}

/// Readiness check
///
/// With a provider configured, readiness follows its health. With the
/// provider disabled the service is always ready.
#[utoipa::path(
    get,
    path = "/ready",
    tag = "health",
    responses(
        (status = 200, description = "Ready to serve", body = ReadinessResponse),
        (status = 503, description = "Inference backend unhealthy", body = ReadinessResponse)
    )
)]
pub async fn readiness_check(
    State(state): State<AppState>,
) -> (StatusCode, Json<ReadinessResponse>) {
    let service = &state.suggestion_service;
    let fallback_only = !service.is_inference_enabled();
    let healthy = service.is_inference_healthy().await;
    let ready = fallback_only || healthy;

    let status_code = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status_code,
        Json(ReadinessResponse {
            ready,
            fallback_only,
            inference: InferenceStatus {
                provider: state.config.inference.provider.to_string(),
                healthy,
                model: healthy.then(|| service.current_model()),
            },
        }),
    )
}
