//! Domain-level errors

use thiserror::Error;

/// Errors that can occur in the domain layer
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// Task text was empty or contained only whitespace
    #[error("Task text must not be empty")]
    EmptyTaskText,

    /// Value is not one of the known categories
    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    /// Value is not one of the known priority levels
    #[error("Unknown priority: {0}")]
    UnknownPriority(String),

    /// Validation failed
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

impl DomainError {
    /// Whether the error was caused by caller input
    #[must_use]
    pub const fn is_invalid_input(&self) -> bool {
        matches!(self, Self::EmptyTaskText | Self::ValidationError(_))
    }
}
