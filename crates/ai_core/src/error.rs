//! Inference errors

use thiserror::Error;

/// Longest provider error body kept in an error message
const MAX_BODY_CHARS: usize = 512;

/// Errors that can occur during inference
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InferenceError {
    /// Failed to connect to inference server
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Request could not be sent or read
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// Model not found or not loaded
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// Response parsing failed
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Timeout during inference
    #[error("Inference timeout after {0}ms")]
    Timeout(u64),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimited {
        /// Seconds from the `Retry-After` header, when the provider sent one
        retry_after_secs: Option<u64>,
    },

    /// Provider is overloaded or a gateway in front of it failed
    #[error("Service unavailable: {0}")]
    Unavailable(String),

    /// Credentials missing, invalid or lacking permission
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Provider rejected the request as malformed
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Server error
    #[error("Server error: {0}")]
    ServerError(String),

    /// Engine cannot be built from the given configuration
    #[error("Not configured: {0}")]
    NotConfigured(String),
}

impl InferenceError {
    /// Whether repeating the same request later may succeed
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::ConnectionFailed(_)
                | Self::Timeout(_)
                | Self::RateLimited { .. }
                | Self::Unavailable(_)
                | Self::ServerError(_)
        )
    }

    #[must_use]
    pub const fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited { .. })
    }

    /// Classify a non-success HTTP status returned by a provider
    pub fn from_status(status: u16, body: &str, retry_after_secs: Option<u64>) -> Self {
        let body = truncate_body(body);
        match status {
            429 => Self::RateLimited { retry_after_secs },
            401 | 403 => Self::AuthenticationFailed(format!("status {status}: {body}")),
            400 | 413 | 422 => Self::InvalidRequest(format!("status {status}: {body}")),
            404 => Self::ModelNotAvailable(body),
            408 | 502 | 503 | 504 | 529 => Self::Unavailable(format!("status {status}: {body}")),
            500..=599 => Self::ServerError(format!("status {status}: {body}")),
            _ => Self::RequestFailed(format!("Unexpected status {status}: {body}")),
        }
    }

    /// Map a transport error, reporting timeouts with the configured budget
    ///
    /// Covers both sending the request and reading the body. A peer that drops
    /// the connection mid-exchange counts as a connection failure.
    pub fn from_transport(err: &reqwest::Error, timeout_ms: u64) -> Self {
        if err.is_timeout() {
            Self::Timeout(timeout_ms)
        } else if err.is_decode() {
            Self::InvalidResponse(err.to_string())
        } else if err.is_connect() || err.is_request() || err.is_body() {
            Self::ConnectionFailed(err.to_string())
        } else {
            Self::RequestFailed(err.to_string())
        }
    }
}

fn truncate_body(body: &str) -> String {
    let body = body.trim();
    match body.char_indices().nth(MAX_BODY_CHARS) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limit_is_transient() {
        let err = InferenceError::from_status(429, "slow down", Some(12));
        assert_eq!(
            err,
            InferenceError::RateLimited {
                retry_after_secs: Some(12)
            }
        );
        assert!(err.is_transient());
        assert!(err.is_rate_limited());
    }

    #[test]
    fn auth_and_bad_request_are_fatal() {
        for status in [400, 401, 403, 404, 422] {
            let err = InferenceError::from_status(status, "nope", None);
            assert!(!err.is_transient(), "status {status} should be fatal");
        }
        assert!(matches!(
            InferenceError::from_status(401, "", None),
            InferenceError::AuthenticationFailed(_)
        ));
        assert!(matches!(
            InferenceError::from_status(404, "model 'x' not found", None),
            InferenceError::ModelNotAvailable(_)
        ));
    }

    #[test]
    fn server_side_failures_are_transient() {
        for status in [500, 502, 503, 504, 529] {
            let err = InferenceError::from_status(status, "", None);
            assert!(err.is_transient(), "status {status} should be transient");
        }
    }

    #[test]
    fn unexpected_status_is_fatal() {
        let err = InferenceError::from_status(302, "moved", None);
        assert!(matches!(err, InferenceError::RequestFailed(_)));
        assert!(!err.is_transient());
    }

    #[test]
    fn timeout_and_connection_are_transient() {
        assert!(InferenceError::Timeout(30_000).is_transient());
        assert!(InferenceError::ConnectionFailed("refused".into()).is_transient());
        assert!(!InferenceError::InvalidResponse("eof".into()).is_transient());
        assert!(!InferenceError::NotConfigured("key".into()).is_transient());
    }

    #[test]
    fn status_messages_share_one_format() {
        for status in [401, 422, 503, 500] {
            let message = InferenceError::from_status(status, "body", None).to_string();
            assert!(
                message.contains(&format!("status {status}: body")),
                "got {message}"
            );
        }
    }

    #[test]
    fn long_bodies_are_truncated() {
        let body = "x".repeat(2000);
        let InferenceError::InvalidRequest(message) = InferenceError::from_status(400, &body, None)
        else {
            unreachable!("expected InvalidRequest");
        };
        assert!(message.len() < 600);
        assert!(message.ends_with("..."));
    }

    #[test]
    fn error_display() {
        assert_eq!(
            InferenceError::Timeout(500).to_string(),
            "Inference timeout after 500ms"
        );
        assert_eq!(
            InferenceError::RateLimited {
                retry_after_secs: None
            }
            .to_string(),
            "Rate limit exceeded"
        );
    }
}
