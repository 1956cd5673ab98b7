//! Infrastructure layer - Adapters for external systems
//!
//! Implements ports defined in the application layer: remote inference via
//! ai_core engines and an in-memory result cache. Also owns configuration
//! loading and tracing setup.

pub mod adapters;
pub mod cache;
pub mod config;
pub mod telemetry;

pub use adapters::*;
pub use cache::{MokaCache, MokaCacheConfig};
pub use config::{
    AppConfig, CacheConfig, Environment, LogFormat, LoggingConfig, RetryAppConfig, ServerConfig,
    SuggestionsConfig,
};
pub use telemetry::{TelemetryError, init_tracing};

use std::sync::Arc;

use application::{ApplicationError, SuggestionService};
use tracing::info;

/// Wire a suggestion service from configuration
///
/// Builds the inference port for the configured provider and attaches the
/// result cache when enabled.
pub fn build_suggestion_service(config: &AppConfig) -> Result<SuggestionService, ApplicationError> {
    let inference = build_inference_port(&config.inference)?;
    let service = SuggestionService::new(inference, config.suggestion_service_config());

    if config.cache.enabled {
        info!(
            max_entries = config.cache.max_entries,
            ttl_secs = config.cache.ttl_secs,
            "Result cache enabled"
        );
        Ok(service.with_cache(Arc::new(MokaCache::with_config(MokaCacheConfig::from(
            &config.cache,
        )))))
    } else {
        Ok(service)
    }
}
