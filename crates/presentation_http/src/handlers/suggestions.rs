//! Suggestion and parse handlers

use application::SuggestionStats;
use axum::{Json, extract::State};
use chrono::NaiveDate;
use domain::{ModelOverride, ParsedTask, SuggestionRequest, SuggestionResult};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use utoipa::ToSchema;
use validator::Validate;

use crate::{error::ApiError, middleware::ValidatedJson, state::AppState};

/// Longest accepted task text, in characters
pub const MAX_TEXT_CHARS: u64 = 2000;

/// Suggestion request body
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[schema(example = json!({"text": "Buy groceries: milk, eggs, bread"}))]
pub struct SuggestBody {
    /// Free-text task
    #[validate(length(min = 1, max = MAX_TEXT_CHARS))]
    pub text: String,
    /// Optional longer description
    #[validate(length(max = 4000))]
    #[serde(default)]
    pub description: Option<String>,
    /// Optional due date hint (YYYY-MM-DD)
    #[serde(default)]
    #[schema(value_type = Option<String>, format = Date)]
    pub due_date: Option<NaiveDate>,
    /// Model override
    #[validate(length(min = 1, max = 200))]
    #[serde(default)]
    pub model: Option<String>,
    /// Sampling temperature override
    #[validate(range(min = 0.0, max = 1.0))]
    #[serde(default)]
    pub temperature: Option<f32>,
    /// Token budget override
    #[validate(range(min = 1, max = 4096))]
    #[serde(default)]
    pub max_tokens: Option<u32>,
}

impl SuggestBody {
    fn into_request(self) -> Result<SuggestionRequest, ApiError> {
        let mut request = SuggestionRequest::new(self.text)
            .map_err(|e| ApiError::BadRequest(e.to_string()))?
            .with_model_override(ModelOverride {
                model: self.model,
                max_tokens: self.max_tokens,
                temperature: self.temperature,
            });
        if let Some(description) = self.description {
            request = request.with_description(description);
        }
        if let Some(due) = self.due_date {
            request = request.with_due_date(due);
        }
        Ok(request)
    }
}

/// Suggestion response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "category": "Shopping",
    "priority": "medium",
    "tips": ["Make a list before you go", "Check for deals"],
    "source": "fallback"
}))]
pub struct SuggestionResponse {
    pub category: String,
    pub priority: String,
    pub tips: Vec<String>,
    /// `model` or `fallback`
    pub source: String,
}

impl From<SuggestionResult> for SuggestionResponse {
    fn from(result: SuggestionResult) -> Self {
        Self {
            category: result.category.label().to_string(),
            priority: result.priority.as_str().to_string(),
            tips: result.tips,
            source: result.source.as_str().to_string(),
        }
    }
}

/// Parse request body
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[schema(example = json!({"text": "Call John about the project. Need to discuss Q4 goals."}))]
pub struct ParseBody {
    #[validate(length(min = 1, max = MAX_TEXT_CHARS))]
    pub text: String,
}

/// Parsed task response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ParsedTaskResponse {
    pub title: String,
    pub description: String,
    pub category: String,
    pub source: String,
}

impl From<ParsedTask> for ParsedTaskResponse {
    fn from(task: ParsedTask) -> Self {
        Self {
            title: task.title,
            description: task.description,
            category: task.category.label().to_string(),
            source: task.source.as_str().to_string(),
        }
    }
}

/// Service statistics response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StatsResponse {
    pub total_requests: u64,
    pub model_results: u64,
    pub fallback_results: u64,
    pub cache_hits: u64,
    pub throttled: u64,
    pub fatal_errors: u64,
    pub parse_failures: u64,
    pub cancelled: u64,
    pub fallback_rate: f64,
    pub model: String,
}

impl StatsResponse {
    fn new(stats: SuggestionStats, model: String) -> Self {
        Self {
            total_requests: stats.total_requests,
            model_results: stats.model_results,
            fallback_results: stats.fallback_results,
            cache_hits: stats.cache_hits,
            throttled: stats.throttled,
            fatal_errors: stats.fatal_errors,
            parse_failures: stats.parse_failures,
            cancelled: stats.cancelled,
            fallback_rate: stats.fallback_rate(),
            model,
        }
    }
}

/// Suggest a category, priority and tips for a task
///
/// Always answers: when the model is unavailable the rule-based result is
/// returned with `source = "fallback"`.
#[utoipa::path(
    post,
    path = "/v1/suggestions",
    tag = "suggestions",
    request_body = SuggestBody,
    responses(
        (status = 200, description = "Suggestion", body = SuggestionResponse),
        (status = 400, description = "Invalid request", body = crate::error::ErrorResponse)
    )
)]
#[instrument(skip(state, body), fields(text_len = body.text.len()))]
pub async fn suggest(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<SuggestBody>,
) -> Result<Json<SuggestionResponse>, ApiError> {
    let request = body.into_request()?;
    let result = state
        .suggestion_service
        .suggest_request(&request, None)
        .await?;
    Ok(Json(result.into()))
}

/// Parse free text into a title, description and category
#[utoipa::path(
    post,
    path = "/v1/tasks/parse",
    tag = "suggestions",
    request_body = ParseBody,
    responses(
        (status = 200, description = "Parsed task", body = ParsedTaskResponse),
        (status = 400, description = "Invalid request", body = crate::error::ErrorResponse)
    )
)]
#[instrument(skip(state, body), fields(text_len = body.text.len()))]
pub async fn parse_task(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<ParseBody>,
) -> Result<Json<ParsedTaskResponse>, ApiError> {
    let task = state.suggestion_service.parse(&body.text).await?;
    Ok(Json(task.into()))
}

/// Service counters
#[utoipa::path(
    get,
    path = "/v1/suggestions/stats",
    tag = "suggestions",
    responses((status = 200, description = "Counters since start", body = StatsResponse))
)]
pub async fn stats(State(state): State<AppState>) -> Json<StatsResponse> {
    let service = &state.suggestion_service;
    Json(StatsResponse::new(service.stats(), service.current_model()))
}
