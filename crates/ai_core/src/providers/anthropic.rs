//! Anthropic Messages API engine

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use super::{check_status, http_client, probe};
use crate::config::InferenceConfig;
use crate::error::InferenceError;
use crate::ports::{InferenceEngine, InferenceRequest, InferenceResponse, TokenUsage};

/// Anthropic API version header value
const ANTHROPIC_API_VERSION: &str = "2023-06-01";

pub struct AnthropicEngine {
    client: Client,
    config: InferenceConfig,
}

impl std::fmt::Debug for AnthropicEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnthropicEngine")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl AnthropicEngine {
    /// Create the engine; an API key is mandatory
    pub fn new(config: InferenceConfig) -> Result<Self, InferenceError> {
        if config.api_key_str().is_none_or(|k| k.trim().is_empty()) {
            return Err(InferenceError::NotConfigured(
                "anthropic provider requires an api_key".to_string(),
            ));
        }
        let client = http_client(&config)?;

        info!(
            base_url = %config.effective_base_url(),
            model = %config.default_model,
            "Initialized Anthropic inference engine"
        );

        Ok(Self { client, config })
    }

    fn api_url(&self, endpoint: &str) -> String {
        format!(
            "{}/v1/{}",
            self.config.effective_base_url(),
            endpoint.trim_start_matches('/')
        )
    }

    fn with_headers(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder
            .header("x-api-key", self.config.api_key_str().unwrap_or_default())
            .header("anthropic-version", ANTHROPIC_API_VERSION)
    }
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    model: String,
    content: Vec<ContentBlock>,
    #[serde(default)]
    stop_reason: Option<String>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    input_tokens: u32,
    output_tokens: u32,
}

#[async_trait]
impl InferenceEngine for AnthropicEngine {
    #[instrument(skip(self, request), fields(model = request.model.as_deref().unwrap_or(&self.config.default_model)))]
    async fn generate(
        &self,
        request: InferenceRequest,
    ) -> Result<InferenceResponse, InferenceError> {
        // System text travels in its own field, not as a message
        let body = MessagesRequest {
            model: request
                .model
                .as_deref()
                .unwrap_or(&self.config.default_model),
            messages: request
                .conversation()
                .map(|m| Message {
                    role: &m.role,
                    content: &m.content,
                })
                .collect(),
            system: request.system_prompt(),
            max_tokens: request.max_tokens.unwrap_or(self.config.max_tokens),
            temperature: request.temperature.unwrap_or(self.config.temperature),
        };

        debug!("Sending messages request");

        let response = self
            .with_headers(self.client.post(self.api_url("messages")))
            .json(&body)
            .send()
            .await
            .map_err(|e| InferenceError::from_transport(&e, self.config.timeout_ms))?;

        let parsed: MessagesResponse = check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| InferenceError::from_transport(&e, self.config.timeout_ms))?;

        let content = parsed
            .content
            .into_iter()
            .filter(|block| block.block_type == "text")
            .filter_map(|block| block.text)
            .collect::<String>();

        Ok(InferenceResponse {
            content,
            model: parsed.model,
            usage: parsed
                .usage
                .map(|u| TokenUsage::new(u.input_tokens, u.output_tokens)),
            finish_reason: parsed.stop_reason,
        })
    }

    #[instrument(skip(self))]
    async fn health_check(&self) -> Result<bool, InferenceError> {
        probe(self.with_headers(self.client.get(self.api_url("models")))).await
    }

    fn default_model(&self) -> &str {
        &self.config.default_model
    }

    fn provider_name(&self) -> &'static str {
        "anthropic"
    }
}
