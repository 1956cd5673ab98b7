//! HTTP error mapping
//!
//! Only invalid input normally reaches this layer; everything else the
//! service turns into a fallback answer. What is left maps to 5xx with the
//! detail hidden unless detail exposure is on (development).

use std::sync::atomic::{AtomicBool, Ordering};

use application::ApplicationError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

static SHOW_DETAILS: AtomicBool = AtomicBool::new(true);

/// Include internal error text in 5xx bodies; off in production
pub fn set_expose_internal_errors(expose: bool) {
    SHOW_DETAILS.store(expose, Ordering::Relaxed);
}

fn details_visible() -> bool {
    SHOW_DETAILS.load(Ordering::Relaxed)
}

/// Errors returned by handlers
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable code
    pub const fn code(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "bad_request",
            Self::ServiceUnavailable(_) => "service_unavailable",
            Self::Internal(_) => "internal_error",
        }
    }

    fn into_body(self) -> ErrorResponse {
        let code = self.code();
        match self {
            Self::BadRequest(message) => ErrorResponse::new(code, message),
            Self::ServiceUnavailable(detail) => ErrorResponse::new(code, "Service temporarily unavailable")
                .with_details(details_visible().then_some(detail)),
            Self::Internal(detail) => ErrorResponse::new(code, "An internal error occurred")
                .with_details(details_visible().then_some(detail)),
        }
    }
}

/// JSON error body
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Human-readable message
    pub error: String,
    /// One of `bad_request`, `validation_error`, `service_unavailable`, `internal_error`
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    pub fn new(code: &str, error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: code.to_string(),
            details: None,
        }
    }

    #[must_use]
    pub fn with_details(mut self, details: Option<String>) -> Self {
        self.details = details;
        self
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }
        (status, Json(self.into_body())).into_response()
    }
}

impl From<ApplicationError> for ApiError {
    fn from(err: ApplicationError) -> Self {
        match err {
            ApplicationError::InvalidInput(msg) => Self::BadRequest(msg),
            ApplicationError::Configuration(msg) | ApplicationError::Internal(msg) => {
                Self::Internal(msg)
            },
            other => Self::ServiceUnavailable(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_input_is_bad_request() {
        let err = ApiError::from(ApplicationError::InvalidInput("Task text must not be empty".into()));
        assert_eq!(err.code(), "bad_request");
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn bad_request_keeps_its_message() {
        let body = ApiError::BadRequest("Task text must not be empty".into()).into_body();
        assert_eq!(body.error, "Task text must not be empty");
        assert!(body.details.is_none());
    }

    #[test]
    fn configuration_error_is_internal() {
        let err = ApiError::from(ApplicationError::Configuration("no engine".into()));
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn inference_errors_are_unavailable() {
        let err = ApiError::from(ApplicationError::FatalInference("401".into()));
        assert_eq!(err.code(), "service_unavailable");
        assert_eq!(err.into_response().status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn error_response_skips_empty_details() {
        let json = serde_json::to_string(&ErrorResponse::new("bad_request", "Bad")).unwrap();
        assert!(!json.contains("details"));
    }
}
