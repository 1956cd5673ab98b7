//! AI Core - Remote text-generation engines
//!
//! Provides a single [`InferenceEngine`] abstraction with one implementation
//! per provider family (Ollama, OpenAI-compatible, Anthropic Messages).
//! Provider-specific envelopes and status codes stay inside this crate;
//! callers only see plain response text and an [`InferenceError`] that knows
//! whether it is worth retrying.

pub mod config;
pub mod error;
pub mod ports;
pub mod providers;

pub use config::{InferenceConfig, ProviderKind};
pub use error::InferenceError;
pub use ports::{InferenceEngine, InferenceMessage, InferenceRequest, InferenceResponse, TokenUsage};
pub use providers::{AnthropicEngine, OllamaEngine, OpenAiCompatibleEngine, build_engine};
