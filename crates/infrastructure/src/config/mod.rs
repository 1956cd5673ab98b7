//! Application configuration
//!
//! Split into focused sub-modules:
//! - `server`: HTTP server settings
//! - `suggestions`: retry policy, timeouts and token budgets
//! - `cache`: result cache
//! - `logging`: log format and filter
//!
//! Sources are layered: built-in defaults, then an optional `config.toml`,
//! then `TASKSAGE_*` environment variables (`__` separates nested keys, e.g.
//! `TASKSAGE_INFERENCE__PROVIDER=anthropic`).

mod cache;
mod logging;
mod server;
mod suggestions;

use std::fmt;
use std::path::Path;

use ai_core::{InferenceConfig, ProviderKind};
use application::SuggestionServiceConfig;
use config::{Config, ConfigBuilder, ConfigError, FileFormat, builder::DefaultState};
use serde::{Deserialize, Serialize};

pub use cache::CacheConfig;
pub use logging::{LogFormat, LoggingConfig};
pub use server::ServerConfig;
pub use suggestions::{RetryAppConfig, SuggestionsConfig};

/// Shared default for boolean `true` fields across config structs
pub(crate) const fn default_true() -> bool {
    true
}

/// Environment variable prefix
pub const ENV_PREFIX: &str = "TASKSAGE";

/// Application environment (development or production)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
        }
    }
}

impl std::str::FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            _ => Err(format!(
                "Invalid environment: {s}. Use 'development' or 'production'"
            )),
        }
    }
}

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub environment: Environment,

    #[serde(default)]
    pub server: ServerConfig,

    /// Remote inference provider
    #[serde(default)]
    pub inference: InferenceConfig,

    #[serde(default)]
    pub suggestions: SuggestionsConfig,

    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from `config.toml` (if present) and the environment
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Load configuration, reading `path` instead of `config.toml` when given
    ///
    /// An explicit path must exist; the default file is optional.
    pub fn load_from(path: Option<&Path>) -> Result<Self, ConfigError> {
        let file = match path {
            Some(path) => config::File::from(path).required(true),
            None => config::File::with_name("config").required(false),
        };

        let config: Self = Self::defaults()?
            .add_source(file)
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("server.allowed_origins")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a TOML document, without environment overrides
    pub fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        let config: Self = Self::defaults()?
            .add_source(config::File::from_str(toml, FileFormat::Toml))
            .build()?
            .try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("inference.provider", "ollama")
    }

    /// Reject settings the service cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let retry = &self.suggestions.retry;
        if retry.multiplier < 1.0 || !retry.multiplier.is_finite() {
            return Err(ConfigError::Message(format!(
                "suggestions.retry.multiplier must be >= 1.0, got {}",
                retry.multiplier
            )));
        }
        if retry.initial_delay_ms > retry.max_delay_ms {
            return Err(ConfigError::Message(
                "suggestions.retry.initial_delay_ms exceeds max_delay_ms".to_string(),
            ));
        }
        if self.suggestions.attempt_timeout_ms == 0 {
            return Err(ConfigError::Message(
                "suggestions.attempt_timeout_ms must be positive".to_string(),
            ));
        }
        if self.suggestions.max_concurrent_invocations == Some(0) {
            return Err(ConfigError::Message(
                "suggestions.max_concurrent_invocations must be positive when set".to_string(),
            ));
        }
        if self.inference.provider == ProviderKind::Anthropic && self.inference.api_key.is_none()
        {
            return Err(ConfigError::Message(
                "inference.api_key is required for the anthropic provider".to_string(),
            ));
        }
        Ok(())
    }

    /// Suggestion service settings assembled from the relevant sections
    #[must_use]
    pub fn suggestion_service_config(&self) -> SuggestionServiceConfig {
        self.suggestions.to_service_config(self.cache.ttl())
    }
}
