//! Application services - Use case implementations

mod model_output;
mod prompts;
mod rules;
mod suggestion_service;

pub use model_output::{extract_json_object, parse_suggestion, parse_task};
pub use prompts::{PromptMode, system_prompt, user_prompt};
pub use rules::{
    CATEGORY_KEYWORDS, HIGH_PRIORITY_MARKERS, LOW_PRIORITY_MARKERS, MAX_FALLBACK_TIPS,
    RuleEngine, category_tips,
};
pub use suggestion_service::{
    SuggestionService, SuggestionServiceConfig, SuggestionStats, generate_cache_key,
};
