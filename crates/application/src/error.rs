//! Application-level errors

use domain::DomainError;
use thiserror::Error;

use crate::cancellation::Cancelled;

/// Errors that can occur in the application layer
///
/// Of these, only [`ApplicationError::InvalidInput`] ever leaves the
/// suggestion service; every inference-related failure is absorbed by the
/// rule-based fallback.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApplicationError {
    /// Caller supplied unusable input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Remote inference failed in a way that may succeed on retry
    #[error("Transient inference error: {0}")]
    TransientInference(String),

    /// Remote inference failed in a way retrying will not fix
    #[error("Fatal inference error: {0}")]
    FatalInference(String),

    /// Retry budget exhausted on transient errors
    #[error("Throttled after {attempts} attempts: {last_error}")]
    Throttled { attempts: u32, last_error: String },

    /// Model output could not be turned into a result
    #[error("Unusable model output: {0}")]
    ResponseParse(String),

    /// Caller abandoned the operation
    #[error("Operation cancelled")]
    Cancelled,

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApplicationError {
    /// Check if this error is retryable
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::TransientInference(_))
    }

    pub const fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }
}

impl From<DomainError> for ApplicationError {
    fn from(err: DomainError) -> Self {
        if err.is_invalid_input() {
            Self::InvalidInput(err.to_string())
        } else {
            Self::ResponseParse(err.to_string())
        }
    }
}

impl From<Cancelled> for ApplicationError {
    fn from(_: Cancelled) -> Self {
        Self::Cancelled
    }
}
