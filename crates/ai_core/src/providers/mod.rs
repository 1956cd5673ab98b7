//! Provider adapters
//!
//! One [`InferenceEngine`] implementation per provider family, plus the
//! HTTP plumbing they share.

mod anthropic;
mod ollama;
mod openai;

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::{Client, Response};
use tracing::{info, warn};

use crate::config::{InferenceConfig, ProviderKind};
use crate::error::InferenceError;
use crate::ports::InferenceEngine;

pub use anthropic::AnthropicEngine;
pub use ollama::OllamaEngine;
pub use openai::OpenAiCompatibleEngine;

/// Timeout for health probes, independent of the generation timeout
const HEALTH_TIMEOUT: Duration = Duration::from_secs(5);

/// Build the engine selected by `config.provider`
///
/// Returns `Ok(None)` when the provider is [`ProviderKind::Disabled`].
pub fn build_engine(
    config: &InferenceConfig,
) -> Result<Option<Arc<dyn InferenceEngine>>, InferenceError> {
    let engine: Arc<dyn InferenceEngine> = match config.provider {
        ProviderKind::Disabled => {
            info!("Remote inference disabled; rule engine only");
            return Ok(None);
        },
        ProviderKind::Ollama => Arc::new(OllamaEngine::new(config.clone())?),
        ProviderKind::OpenAi => Arc::new(OpenAiCompatibleEngine::new(config.clone())?),
        ProviderKind::Anthropic => Arc::new(AnthropicEngine::new(config.clone())?),
    };
    Ok(Some(engine))
}

fn http_client(config: &InferenceConfig) -> Result<Client, InferenceError> {
    Client::builder()
        .timeout(Duration::from_millis(config.timeout_ms))
        .build()
        .map_err(|e| InferenceError::NotConfigured(format!("HTTP client: {e}")))
}

/// Pass successful responses through; classify everything else
async fn check_status(response: Response) -> Result<Response, InferenceError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let retry_after = retry_after_secs(response.headers());
    let body = response.text().await.unwrap_or_default();
    warn!(status = %status, retry_after = ?retry_after, "Inference request failed");
    Err(InferenceError::from_status(status.as_u16(), &body, retry_after))
}

fn retry_after_secs(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}

/// Health probe shared by all providers: unreachable means unhealthy,
/// not an error
async fn probe(request: reqwest::RequestBuilder) -> Result<bool, InferenceError> {
    match request.timeout(HEALTH_TIMEOUT).send().await {
        Ok(resp) => Ok(resp.status().is_success()),
        Err(e) if e.is_timeout() || e.is_connect() => Ok(false),
        Err(e) => Err(InferenceError::RequestFailed(e.to_string())),
    }
}
