//! Suggestion service tuning: retry policy, timeouts, token budgets.

use std::time::Duration;

use application::{RetryConfig, SuggestionServiceConfig};
use serde::{Deserialize, Serialize};

/// Retry configuration for inference calls
///
/// Delay before retry `n` is `min(initial_delay_ms * multiplier^n, max_delay_ms)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryAppConfig {
    /// Initial delay before first retry in milliseconds (default: 500ms)
    #[serde(default = "default_retry_initial_delay")]
    pub initial_delay_ms: u64,

    /// Maximum delay between retries in milliseconds (default: 4000ms)
    #[serde(default = "default_retry_max_delay")]
    pub max_delay_ms: u64,

    /// Multiplier for exponential backoff (default: 2.0)
    #[serde(default = "default_retry_multiplier")]
    pub multiplier: f64,

    /// Maximum number of retry attempts (default: 3)
    #[serde(default = "default_retry_max_retries")]
    pub max_retries: u32,

    /// Randomize delays by up to `jitter_factor` (default: off)
    #[serde(default)]
    pub jitter: bool,

    #[serde(default = "default_jitter_factor")]
    pub jitter_factor: f64,
}

const fn default_retry_initial_delay() -> u64 {
    500
}

const fn default_retry_max_delay() -> u64 {
    4_000
}

const fn default_retry_multiplier() -> f64 {
    2.0
}

const fn default_retry_max_retries() -> u32 {
    3
}

const fn default_jitter_factor() -> f64 {
    0.1
}

impl Default for RetryAppConfig {
    fn default() -> Self {
        Self {
            initial_delay_ms: default_retry_initial_delay(),
            max_delay_ms: default_retry_max_delay(),
            multiplier: default_retry_multiplier(),
            max_retries: default_retry_max_retries(),
            jitter: false,
            jitter_factor: default_jitter_factor(),
        }
    }
}

impl RetryAppConfig {
    /// Convert to the application retry policy
    #[must_use]
    pub fn to_retry_config(&self) -> RetryConfig {
        let config = RetryConfig::new(
            self.initial_delay_ms,
            self.max_delay_ms,
            self.multiplier,
            self.max_retries,
        );
        if self.jitter {
            config.with_jitter(self.jitter_factor)
        } else {
            config
        }
    }
}

/// Suggestion service configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestionsConfig {
    #[serde(default)]
    pub retry: RetryAppConfig,

    /// Upper bound on a single inference attempt in milliseconds
    #[serde(default = "default_attempt_timeout")]
    pub attempt_timeout_ms: u64,

    #[serde(default = "default_suggest_max_tokens")]
    pub suggest_max_tokens: u32,

    #[serde(default = "default_parse_max_tokens")]
    pub parse_max_tokens: u32,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Process-wide cap on in-flight invocations (default: unlimited)
    #[serde(default)]
    pub max_concurrent_invocations: Option<usize>,
}

const fn default_attempt_timeout() -> u64 {
    30_000
}

const fn default_suggest_max_tokens() -> u32 {
    200
}

const fn default_parse_max_tokens() -> u32 {
    100
}

const fn default_temperature() -> f32 {
    0.3
}

impl Default for SuggestionsConfig {
    fn default() -> Self {
        Self {
            retry: RetryAppConfig::default(),
            attempt_timeout_ms: default_attempt_timeout(),
            suggest_max_tokens: default_suggest_max_tokens(),
            parse_max_tokens: default_parse_max_tokens(),
            temperature: default_temperature(),
            max_concurrent_invocations: None,
        }
    }
}

impl SuggestionsConfig {
    /// Build the service configuration; `cache_ttl` comes from the cache section
    #[must_use]
    pub fn to_service_config(&self, cache_ttl: Duration) -> SuggestionServiceConfig {
        SuggestionServiceConfig {
            model: None,
            temperature: self.temperature.clamp(0.0, 1.0),
            suggest_max_tokens: self.suggest_max_tokens,
            parse_max_tokens: self.parse_max_tokens,
            retry: self.retry.to_retry_config(),
            attempt_timeout: Duration::from_millis(self.attempt_timeout_ms),
            cache_ttl,
            max_concurrent_invocations: self.max_concurrent_invocations,
        }
    }
}
