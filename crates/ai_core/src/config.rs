//! Configuration for inference engines

use std::fmt;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

/// Which provider family to talk to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Ollama `/api/chat`
    #[default]
    Ollama,
    /// Any server exposing `/v1/chat/completions`
    #[serde(alias = "openai_compatible")]
    OpenAi,
    /// Anthropic Messages API
    Anthropic,
    /// No remote inference; every call uses the rule engine
    Disabled,
}

impl ProviderKind {
    /// Base URL used when none is configured
    #[must_use]
    pub const fn default_base_url(&self) -> &'static str {
        match self {
            Self::Ollama | Self::Disabled => "http://localhost:11434",
            Self::OpenAi => "https://api.openai.com",
            Self::Anthropic => "https://api.anthropic.com",
        }
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Ollama => "ollama",
            Self::OpenAi => "openai",
            Self::Anthropic => "anthropic",
            Self::Disabled => "disabled",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration for the inference engine
#[derive(Clone, Serialize, Deserialize)]
pub struct InferenceConfig {
    #[serde(default)]
    pub provider: ProviderKind,

    /// Base URL of the provider; the provider default is used when unset
    #[serde(default)]
    pub base_url: Option<String>,

    /// Default model to use
    #[serde(default = "default_model")]
    pub default_model: String,

    /// API key for hosted providers (sensitive - never serialized)
    #[serde(default, skip_serializing)]
    pub api_key: Option<SecretString>,

    /// Per-request timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Maximum tokens to generate when a request does not say
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Sampling temperature when a request does not say (0.0 - 1.0)
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

fn default_model() -> String {
    "llama3.2:3b".to_string()
}

const fn default_timeout_ms() -> u64 {
    30_000
}

const fn default_max_tokens() -> u32 {
    200
}

const fn default_temperature() -> f32 {
    0.3
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::default(),
            base_url: None,
            default_model: default_model(),
            api_key: None,
            timeout_ms: default_timeout_ms(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
        }
    }
}

impl fmt::Debug for InferenceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InferenceConfig")
            .field("provider", &self.provider)
            .field("base_url", &self.base_url)
            .field("default_model", &self.default_model)
            .field(
                "api_key",
                &if self.api_key.is_some() {
                    Some("[REDACTED]")
                } else {
                    None
                },
            )
            .field("timeout_ms", &self.timeout_ms)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .finish()
    }
}

impl InferenceConfig {
    /// Config for a local Ollama server
    pub fn ollama(model: impl Into<String>) -> Self {
        Self {
            default_model: model.into(),
            ..Default::default()
        }
    }

    /// Config that turns remote inference off
    pub fn disabled() -> Self {
        Self {
            provider: ProviderKind::Disabled,
            ..Default::default()
        }
    }

    /// Base URL without a trailing slash
    pub fn effective_base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| self.provider.default_base_url())
            .trim_end_matches('/')
    }

    /// Get the API key as a string reference (for request headers)
    #[must_use]
    pub fn api_key_str(&self) -> Option<&str> {
        self.api_key.as_ref().map(ExposeSecret::expose_secret)
    }

    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        !matches!(self.provider, ProviderKind::Disabled)
    }
}
