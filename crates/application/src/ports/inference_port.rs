//! Inference port - the remote text-generation capability
//!
//! Adapters translate provider envelopes into plain text and provider
//! failures into [`ApplicationError::TransientInference`] or
//! [`ApplicationError::FatalInference`].

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::error::ApplicationError;

/// One fully resolved invocation
#[derive(Debug, Clone, PartialEq)]
pub struct InvocationRequest {
    /// Model to use; the adapter default when `None`
    pub model_id: Option<String>,
    pub system_prompt: String,
    pub prompt: String,
    pub max_tokens: u32,
    /// Sampling temperature in [0, 1]
    pub temperature: f32,
}

/// Result of an inference call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InferenceResult {
    /// Raw generated text
    pub content: String,
    /// Model used for generation
    pub model: String,
    /// Number of tokens used (if available)
    pub tokens_used: Option<u32>,
    /// Latency in milliseconds
    pub latency_ms: u64,
}

/// Port for inference operations
#[cfg_attr(test, automock)]
#[async_trait]
pub trait InferencePort: Send + Sync {
    /// Run a single generation
    async fn invoke(&self, request: &InvocationRequest)
    -> Result<InferenceResult, ApplicationError>;

    /// Check if the inference backend is healthy
    async fn is_healthy(&self) -> bool;

    /// Get the name of the current default model
    fn current_model(&self) -> String;

    /// `false` when no remote backend is configured at all
    fn is_enabled(&self) -> bool {
        true
    }
}
