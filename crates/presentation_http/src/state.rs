//! Application state shared across handlers

use std::sync::Arc;

use application::SuggestionService;
use infrastructure::AppConfig;

/// Shared application state
#[derive(Debug, Clone)]
pub struct AppState {
    /// Suggestion service with its rule-based fallback
    pub suggestion_service: Arc<SuggestionService>,
    /// Application configuration
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(suggestion_service: SuggestionService, config: AppConfig) -> Self {
        Self {
            suggestion_service: Arc::new(suggestion_service),
            config: Arc::new(config),
        }
    }
}
