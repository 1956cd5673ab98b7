//! Application layer - Use cases and orchestration
//!
//! Holds the suggestion service, its rule-based fallback and the retry
//! policy, plus the port definitions infrastructure adapters implement.

pub mod cancellation;
pub mod error;
pub mod ports;
pub mod retry;
pub mod services;

pub use cancellation::{CancellationToken, Cancelled};
pub use error::ApplicationError;
pub use ports::*;
pub use retry::{RetryConfig, RetryResult, Retryable, with_retry};
pub use services::*;
