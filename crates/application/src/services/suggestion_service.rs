//! Suggestion service - remote inference with a rule-based safety net
//!
//! Every call produces a result. The remote model is tried first, with
//! retries on transient failures; whenever the model path fails for any
//! reason the [`RuleEngine`] answers instead. Callers only ever see
//! [`ApplicationError::InvalidInput`].

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use domain::{Category, ParsedTask, SuggestionRequest, SuggestionResult};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::{Semaphore, SemaphorePermit};
use tracing::{debug, info, instrument, warn};

use super::model_output::{parse_suggestion, parse_task};
use super::prompts::{PromptMode, system_prompt, user_prompt};
use super::rules::RuleEngine;
use crate::cancellation::CancellationToken;
use crate::error::ApplicationError;
use crate::ports::{CachePort, CachePortExt, InferencePort, InferenceResult, InvocationRequest};
use crate::retry::{RetryConfig, with_retry};

/// Tunables for [`SuggestionService`]
#[derive(Debug, Clone, PartialEq)]
pub struct SuggestionServiceConfig {
    /// Model to request; the adapter default when `None`
    pub model: Option<String>,
    /// Sampling temperature, clamped to [0, 1]
    pub temperature: f32,
    pub suggest_max_tokens: u32,
    pub parse_max_tokens: u32,
    pub retry: RetryConfig,
    /// Upper bound on a single inference attempt
    pub attempt_timeout: Duration,
    pub cache_ttl: Duration,
    /// Cap on concurrent in-flight invocations; unlimited when `None`
    pub max_concurrent_invocations: Option<usize>,
}

impl Default for SuggestionServiceConfig {
    fn default() -> Self {
        Self {
            model: None,
            temperature: 0.3,
            suggest_max_tokens: 200,
            parse_max_tokens: 100,
            retry: RetryConfig::default(),
            attempt_timeout: Duration::from_secs(30),
            cache_ttl: Duration::from_secs(3600),
            max_concurrent_invocations: None,
        }
    }
}

/// Snapshot of service counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SuggestionStats {
    pub total_requests: u64,
    pub model_results: u64,
    pub fallback_results: u64,
    pub cache_hits: u64,
    pub throttled: u64,
    pub fatal_errors: u64,
    pub parse_failures: u64,
    pub cancelled: u64,
}

impl SuggestionStats {
    /// Share of answered requests that came from the rule engine
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn fallback_rate(&self) -> f64 {
        let answered = self.model_results + self.fallback_results;
        if answered == 0 {
            0.0
        } else {
            self.fallback_results as f64 / answered as f64
        }
    }
}

#[derive(Debug, Default)]
struct Counters {
    total_requests: AtomicU64,
    model_results: AtomicU64,
    fallback_results: AtomicU64,
    cache_hits: AtomicU64,
    throttled: AtomicU64,
    fatal_errors: AtomicU64,
    parse_failures: AtomicU64,
    cancelled: AtomicU64,
}

fn bump(counter: &AtomicU64) {
    counter.fetch_add(1, Ordering::Relaxed);
}

impl Counters {
    fn snapshot(&self) -> SuggestionStats {
        SuggestionStats {
            total_requests: self.total_requests.load(Ordering::Relaxed),
            model_results: self.model_results.load(Ordering::Relaxed),
            fallback_results: self.fallback_results.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            throttled: self.throttled.load(Ordering::Relaxed),
            fatal_errors: self.fatal_errors.load(Ordering::Relaxed),
            parse_failures: self.parse_failures.load(Ordering::Relaxed),
            cancelled: self.cancelled.load(Ordering::Relaxed),
        }
    }
}

/// Model settings after applying per-request overrides
#[derive(Debug, Clone, PartialEq)]
struct ResolvedSettings {
    model: Option<String>,
    max_tokens: u32,
    temperature: f32,
}

/// Generate a cache key from components using blake3
#[must_use]
pub fn generate_cache_key(prefix: &str, components: &[&str]) -> String {
    let mut hasher = blake3::Hasher::new();
    for component in components {
        hasher.update(component.as_bytes());
        hasher.update(b"|");
    }
    format!("{prefix}:{}", hasher.finalize().to_hex())
}

/// Produces task suggestions and parsed tasks
pub struct SuggestionService {
    inference: Arc<dyn InferencePort>,
    cache: Option<Arc<dyn CachePort>>,
    rules: RuleEngine,
    limiter: Option<Semaphore>,
    config: SuggestionServiceConfig,
    counters: Counters,
}

impl fmt::Debug for SuggestionService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SuggestionService")
            .field("config", &self.config)
            .field("cached", &self.cache.is_some())
            .finish_non_exhaustive()
    }
}

impl SuggestionService {
    /// Create a new suggestion service
    pub fn new(inference: Arc<dyn InferencePort>, config: SuggestionServiceConfig) -> Self {
        let limiter = config
            .max_concurrent_invocations
            .map(|permits| Semaphore::new(permits.max(1)));
        Self {
            inference,
            cache: None,
            rules: RuleEngine::new(),
            limiter,
            config,
            counters: Counters::default(),
        }
    }

    /// Cache model results
    #[must_use]
    pub fn with_cache(mut self, cache: Arc<dyn CachePort>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Suggest a category, priority and tips for `text`
    pub async fn suggest(&self, text: &str) -> Result<SuggestionResult, ApplicationError> {
        let request = SuggestionRequest::new(text)?;
        self.suggest_request(&request, None).await
    }

    /// Parse `text` into a title, description and category
    pub async fn parse(&self, text: &str) -> Result<ParsedTask, ApplicationError> {
        let request = SuggestionRequest::new(text)?;
        self.parse_request(&request, None).await
    }

    /// Suggest for a fully specified request
    ///
    /// Cancelling `cancel` abandons the model path and returns the
    /// rule-based result straight away.
    #[instrument(skip(self, request, cancel), fields(text_len = request.text().len()))]
    pub async fn suggest_request(
        &self,
        request: &SuggestionRequest,
        cancel: Option<&CancellationToken>,
    ) -> Result<SuggestionResult, ApplicationError> {
        bump(&self.counters.total_requests);

        if let Some(result) = self
            .run_model(PromptMode::Suggest, request, cancel, parse_suggestion)
            .await
        {
            return Ok(result);
        }

        bump(&self.counters.fallback_results);
        Ok(self.rules.suggest(&request.classification_text()))
    }

    /// Parse a fully specified request
    #[instrument(skip(self, request, cancel), fields(text_len = request.text().len()))]
    pub async fn parse_request(
        &self,
        request: &SuggestionRequest,
        cancel: Option<&CancellationToken>,
    ) -> Result<ParsedTask, ApplicationError> {
        bump(&self.counters.total_requests);

        let classify = || self.rules.classify_category(request.text());
        if let Some(task) = self
            .run_model(PromptMode::Parse, request, cancel, |content| {
                parse_task(content, classify)
            })
            .await
        {
            return Ok(task);
        }

        bump(&self.counters.fallback_results);
        Ok(self.rules.parse(request.text()))
    }

    /// Rule-based classification, bypassing the model entirely
    pub fn classify_offline(&self, text: &str) -> Category {
        self.rules.classify_category(text)
    }

    /// Current counters
    pub fn stats(&self) -> SuggestionStats {
        self.counters.snapshot()
    }

    /// Check if the inference backend is healthy
    pub async fn is_inference_healthy(&self) -> bool {
        self.inference.is_enabled() && self.inference.is_healthy().await
    }

    /// `false` when the service always answers from the rule engine
    pub fn is_inference_enabled(&self) -> bool {
        self.inference.is_enabled()
    }

    /// Model requests go to
    pub fn current_model(&self) -> String {
        self.config
            .model
            .clone()
            .unwrap_or_else(|| self.inference.current_model())
    }

    /// Try the model path; `None` means answer from the rule engine
    async fn run_model<T, P>(
        &self,
        mode: PromptMode,
        request: &SuggestionRequest,
        cancel: Option<&CancellationToken>,
        parse: P,
    ) -> Option<T>
    where
        T: Serialize + DeserializeOwned + Send + Sync,
        P: FnOnce(&str) -> Result<T, ApplicationError>,
    {
        if !self.inference.is_enabled() {
            debug!("Remote inference disabled, using rules");
            return None;
        }

        let settings = self.resolve_settings(mode, request);
        let cache_key = self.cache_key(mode, request, &settings);

        if let Some(cache) = &self.cache {
            match cache.get_json::<T>(&cache_key).await {
                Ok(Some(cached)) => {
                    debug!(mode = mode.as_str(), "Suggestion cache hit");
                    bump(&self.counters.cache_hits);
                    bump(&self.counters.model_results);
                    return Some(cached);
                },
                Ok(None) => {},
                Err(e) => warn!(error = %e, "Suggestion cache read failed"),
            }
        }

        let invocation = InvocationRequest {
            model_id: settings.model,
            system_prompt: system_prompt(mode).to_string(),
            prompt: user_prompt(mode, request),
            max_tokens: settings.max_tokens,
            temperature: settings.temperature,
        };

        let response = match self.invoke_with_retry(&invocation, cancel).await {
            Ok(response) => response,
            Err(e) => {
                self.record_failure(&e);
                return None;
            },
        };

        match parse(&response.content) {
            Ok(value) => {
                debug!(
                    model = %response.model,
                    tokens = ?response.tokens_used,
                    latency_ms = response.latency_ms,
                    "Model result accepted"
                );
                bump(&self.counters.model_results);
                if let Some(cache) = &self.cache {
                    if let Err(e) = cache.put_json(&cache_key, &value, self.config.cache_ttl).await {
                        warn!(error = %e, "Suggestion cache write failed");
                    }
                }
                Some(value)
            },
            Err(e) => {
                self.record_failure(&e);
                None
            },
        }
    }

    fn record_failure(&self, error: &ApplicationError) {
        match error {
            ApplicationError::Throttled { attempts, .. } => {
                bump(&self.counters.throttled);
                warn!(attempts, error = %error, "Inference throttled, using rules");
            },
            ApplicationError::Cancelled => {
                bump(&self.counters.cancelled);
                info!("Suggestion cancelled, using rules");
            },
            ApplicationError::ResponseParse(_) => {
                bump(&self.counters.parse_failures);
                warn!(error = %error, "Model output unusable, using rules");
            },
            _ => {
                bump(&self.counters.fatal_errors);
                warn!(error = %error, "Inference failed, using rules");
            },
        }
    }

    /// Run the invocation under the retry policy
    ///
    /// A retryable error that survives the whole budget becomes
    /// [`ApplicationError::Throttled`].
    #[allow(clippy::cast_possible_truncation)]
    async fn invoke_with_retry(
        &self,
        invocation: &InvocationRequest,
        cancel: Option<&CancellationToken>,
    ) -> Result<InferenceResult, ApplicationError> {
        let outcome = with_retry(&self.config.retry, cancel, || self.attempt(invocation)).await;

        if outcome.attempts > 1 {
            debug!(
                attempts = outcome.attempts,
                backoff = ?outcome.delays,
                elapsed_ms = outcome.total_duration.as_millis() as u64,
                "Invocation needed retries"
            );
        }

        match outcome.result {
            Err(e) if e.is_retryable() => Err(ApplicationError::Throttled {
                attempts: outcome.attempts,
                last_error: e.to_string(),
            }),
            other => other,
        }
    }

    /// A single attempt, bounded by the attempt timeout and the limiter
    #[allow(clippy::cast_possible_truncation)]
    async fn attempt(
        &self,
        invocation: &InvocationRequest,
    ) -> Result<InferenceResult, ApplicationError> {
        let _permit = self.acquire_permit().await?;
        let limit = self.config.attempt_timeout;

        match tokio::time::timeout(limit, self.inference.invoke(invocation)).await {
            Ok(result) => result,
            Err(_) => Err(ApplicationError::TransientInference(format!(
                "Inference attempt timed out after {}ms",
                limit.as_millis() as u64
            ))),
        }
    }

    async fn acquire_permit(&self) -> Result<Option<SemaphorePermit<'_>>, ApplicationError> {
        match &self.limiter {
            Some(limiter) => limiter
                .acquire()
                .await
                .map(Some)
                .map_err(|e| ApplicationError::Internal(format!("Invocation limiter closed: {e}"))),
            None => Ok(None),
        }
    }

    fn resolve_settings(&self, mode: PromptMode, request: &SuggestionRequest) -> ResolvedSettings {
        let overrides = request.model_override();
        let default_tokens = match mode {
            PromptMode::Suggest => self.config.suggest_max_tokens,
            PromptMode::Parse => self.config.parse_max_tokens,
        };
        let temperature = overrides
            .and_then(|o| o.temperature)
            .filter(|t| t.is_finite())
            .unwrap_or(self.config.temperature)
            .clamp(0.0, 1.0);

        ResolvedSettings {
            model: overrides
                .and_then(|o| o.model.clone())
                .or_else(|| self.config.model.clone()),
            max_tokens: overrides
                .and_then(|o| o.max_tokens)
                .filter(|tokens| *tokens > 0)
                .unwrap_or(default_tokens),
            temperature,
        }
    }

    fn cache_key(
        &self,
        mode: PromptMode,
        request: &SuggestionRequest,
        settings: &ResolvedSettings,
    ) -> String {
        let text = request.text().trim().to_lowercase();
        let description = request
            .description()
            .map(|d| d.trim().to_lowercase())
            .unwrap_or_default();
        let due = request
            .due_date()
            .map(|d| d.to_string())
            .unwrap_or_default();
        let model = settings
            .model
            .clone()
            .unwrap_or_else(|| self.inference.current_model());
        let max_tokens = settings.max_tokens.to_string();
        let temperature = format!("{:.2}", settings.temperature);

        generate_cache_key(
            mode.as_str(),
            &[&text, &description, &due, &model, &max_tokens, &temperature],
        )
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::AtomicU32;

    use async_trait::async_trait;
    use domain::{ModelOverride, Priority, Source};

    use super::*;
    use crate::ports::MockInferencePort;

    fn ok_response(content: &str) -> Result<InferenceResult, ApplicationError> {
        Ok(InferenceResult {
            content: content.to_string(),
            model: "test-model".to_string(),
            tokens_used: Some(42),
            latency_ms: 12,
        })
    }

    fn enabled_mock() -> MockInferencePort {
        let mut mock = MockInferencePort::new();
        mock.expect_is_enabled().return_const(true);
        mock.expect_current_model()
            .return_const("test-model".to_string());
        mock
    }

    fn service(mock: MockInferencePort) -> SuggestionService {
        SuggestionService::new(Arc::new(mock), SuggestionServiceConfig::default())
    }

    /// Fails with a fixed error a given number of times, then answers
    struct ScriptedInference {
        calls: AtomicU32,
        failures: u32,
        error: ApplicationError,
        content: String,
        delay: Duration,
    }

    impl ScriptedInference {
        fn failing(failures: u32, error: ApplicationError) -> Self {
            Self {
                calls: AtomicU32::new(0),
                failures,
                error,
                content: r#"{"category": "Work", "priority": "high", "tips": ["Start now"]}"#
                    .to_string(),
                delay: Duration::ZERO,
            }
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl InferencePort for ScriptedInference {
        async fn invoke(
            &self,
            _request: &InvocationRequest,
        ) -> Result<InferenceResult, ApplicationError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            if call < self.failures {
                Err(self.error.clone())
            } else {
                ok_response(&self.content)
            }
        }

        async fn is_healthy(&self) -> bool {
            true
        }

        fn current_model(&self) -> String {
            "scripted".to_string()
        }
    }

    #[derive(Debug, Default)]
    struct MapCache {
        entries: Mutex<HashMap<String, String>>,
    }

    #[async_trait]
    impl CachePort for MapCache {
        async fn load(&self, key: &str) -> Result<Option<String>, ApplicationError> {
            Ok(self.entries.lock().unwrap().get(key).cloned())
        }

        async fn store(
            &self,
            key: &str,
            json: String,
            _ttl: Duration,
        ) -> Result<(), ApplicationError> {
            self.entries.lock().unwrap().insert(key.to_string(), json);
            Ok(())
        }
    }

    #[tokio::test]
    async fn blank_text_is_rejected_without_inference() {
        let mock = MockInferencePort::new();
        let service = service(mock);

        let err = service.suggest("   ").await.unwrap_err();
        assert!(err.is_invalid_input());
        let err = service.parse("").await.unwrap_err();
        assert!(err.is_invalid_input());
        assert_eq!(service.stats().total_requests, 0);
    }

    #[tokio::test]
    async fn model_result_is_returned() {
        let mut mock = enabled_mock();
        mock.expect_invoke().times(1).returning(|_| {
            ok_response(
                r#"Here is my answer: {"category": "Finance", "priority": "high", "tips": ["Pay online", "Set a reminder"]}"#,
            )
        });

        let service = service(mock);
        let result = service.suggest("Pay the electricity bill").await.unwrap();

        assert_eq!(result.category, Category::Finance);
        assert_eq!(result.priority, Priority::High);
        assert_eq!(result.tips, vec!["Pay online", "Set a reminder"]);
        assert_eq!(result.source, Source::Model);
        assert_eq!(service.stats().model_results, 1);
    }

    #[tokio::test]
    async fn invocation_carries_resolved_settings() {
        let mut mock = enabled_mock();
        mock.expect_invoke()
            .withf(|req| {
                req.model_id.as_deref() == Some("qwen2.5:1.5b")
                    && req.max_tokens == 64
                    && (req.temperature - 1.0).abs() < f32::EPSILON
                    && req.prompt == "Task: Buy milk"
                    && req.system_prompt.contains("Shopping")
            })
            .times(1)
            .returning(|_| ok_response(r#"{"category": "Shopping", "priority": "low"}"#));

        let service = service(mock);
        let request = SuggestionRequest::new("Buy milk")
            .unwrap()
            .with_model_override(ModelOverride {
                model: Some("qwen2.5:1.5b".to_string()),
                max_tokens: Some(64),
                temperature: Some(7.5),
            });

        let result = service.suggest_request(&request, None).await.unwrap();
        assert_eq!(result.category, Category::Shopping);
    }

    #[tokio::test]
    async fn fatal_error_falls_back_without_retry() {
        let mut mock = enabled_mock();
        mock.expect_invoke()
            .times(1)
            .returning(|_| Err(ApplicationError::FatalInference("401 Unauthorized".into())));

        let service = service(mock);
        let result = service
            .suggest("Buy groceries: milk, eggs, bread")
            .await
            .unwrap();

        assert_eq!(result.category, Category::Shopping);
        assert_eq!(result.priority, Priority::Medium);
        assert_eq!(result.source, Source::Fallback);
        let stats = service.stats();
        assert_eq!(stats.fatal_errors, 1);
        assert_eq!(stats.fallback_results, 1);
    }

    #[tokio::test]
    async fn unparseable_output_falls_back() {
        let mut mock = enabled_mock();
        mock.expect_invoke()
            .times(1)
            .returning(|_| ok_response("I would call this a health task, quite urgent."));

        let service = service(mock);
        let result = service
            .suggest("Call the dentist to schedule an urgent appointment")
            .await
            .unwrap();

        assert_eq!(result.category, Category::Health);
        assert_eq!(result.priority, Priority::High);
        assert_eq!(result.tips.len(), 3);
        assert!(result.is_fallback());
        assert_eq!(service.stats().parse_failures, 1);
    }

    #[tokio::test]
    async fn unknown_category_from_model_falls_back() {
        let mut mock = enabled_mock();
        mock.expect_invoke().times(1).returning(|_| {
            ok_response(r#"{"category": "Chores", "priority": "low", "tips": []}"#)
        });

        let service = service(mock);
        let result = service.suggest("Vacuum the living room").await.unwrap();
        assert_eq!(result.category, Category::Home);
        assert!(result.is_fallback());
    }

    #[tokio::test(start_paused = true)]
    async fn transient_errors_are_retried_then_throttled() {
        let inference = Arc::new(ScriptedInference::failing(
            u32::MAX,
            ApplicationError::TransientInference("Rate limit exceeded".into()),
        ));
        let service = SuggestionService::new(
            Arc::clone(&inference) as Arc<dyn InferencePort>,
            SuggestionServiceConfig::default(),
        );

        let started = tokio::time::Instant::now();
        let result = service.suggest("Finish the quarterly report").await.unwrap();

        assert_eq!(inference.calls(), 4);
        assert_eq!(started.elapsed(), Duration::from_millis(3500));
        assert!(result.is_fallback());
        assert_eq!(result.category, Category::Work);
        assert_eq!(service.stats().throttled, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn transient_error_then_success() {
        let inference = Arc::new(ScriptedInference::failing(
            2,
            ApplicationError::TransientInference("503".into()),
        ));
        let service = SuggestionService::new(
            Arc::clone(&inference) as Arc<dyn InferencePort>,
            SuggestionServiceConfig::default(),
        );

        let result = service.suggest("Prepare the client proposal").await.unwrap();

        assert_eq!(inference.calls(), 3);
        assert_eq!(result.source, Source::Model);
        assert_eq!(result.priority, Priority::High);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_attempts_time_out_and_count_as_transient() {
        let mut scripted = ScriptedInference::failing(0, ApplicationError::Cancelled);
        scripted.delay = Duration::from_secs(60);
        let inference = Arc::new(scripted);
        let config = SuggestionServiceConfig {
            attempt_timeout: Duration::from_secs(1),
            retry: RetryConfig::new(100, 100, 1.0, 1),
            ..SuggestionServiceConfig::default()
        };
        let service =
            SuggestionService::new(Arc::clone(&inference) as Arc<dyn InferencePort>, config);

        let result = service.suggest("Book a hotel for the trip").await.unwrap();

        assert_eq!(inference.calls(), 2);
        assert!(result.is_fallback());
        assert_eq!(result.category, Category::Travel);
        assert_eq!(service.stats().throttled, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_stops_retrying() {
        let inference = Arc::new(ScriptedInference::failing(
            u32::MAX,
            ApplicationError::TransientInference("429".into()),
        ));
        let service = SuggestionService::new(
            Arc::clone(&inference) as Arc<dyn InferencePort>,
            SuggestionServiceConfig::default(),
        );
        let token = CancellationToken::new();
        let request = SuggestionRequest::new("Pay rent tomorrow").unwrap();

        let canceller = {
            let token = token.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(700)).await;
                token.cancel();
            })
        };

        let started = tokio::time::Instant::now();
        let result = service
            .suggest_request(&request, Some(&token))
            .await
            .unwrap();
        canceller.await.unwrap();

        assert_eq!(inference.calls(), 2);
        assert_eq!(started.elapsed(), Duration::from_millis(700));
        assert!(result.is_fallback());
        assert_eq!(result.category, Category::Finance);
        assert_eq!(service.stats().cancelled, 1);
    }

    #[tokio::test]
    async fn disabled_inference_uses_rules_only() {
        let mut mock = MockInferencePort::new();
        mock.expect_is_enabled().return_const(false);
        mock.expect_invoke().never();

        let service = service(mock);
        let task = service
            .parse("Call John about the project. Need to discuss Q4 goals.")
            .await
            .unwrap();

        assert_eq!(task.title, "Call John about the project");
        assert_eq!(task.description, "Need to discuss Q4 goals.");
        assert_eq!(task.category, Category::Work);
        assert_eq!(task.source, Source::Fallback);
        assert!(!service.is_inference_healthy().await);
        assert_eq!(service.stats().fatal_errors, 0);
    }

    #[tokio::test]
    async fn parse_fills_missing_category_from_rules() {
        let mut mock = enabled_mock();
        mock.expect_invoke()
            .withf(|req| req.max_tokens == 100 && req.prompt.starts_with("Input: "))
            .times(1)
            .returning(|_| ok_response(r#"{"title": "Schedule checkup"}"#));

        let service = service(mock);
        let task = service
            .parse("Schedule a checkup with the doctor")
            .await
            .unwrap();

        assert_eq!(task.title, "Schedule checkup");
        assert_eq!(task.description, "");
        assert_eq!(task.category, Category::Health);
        assert_eq!(task.source, Source::Model);
    }

    #[tokio::test]
    async fn model_results_are_cached() {
        let mut mock = enabled_mock();
        mock.expect_invoke().times(1).returning(|_| {
            ok_response(r#"{"category": "Learning", "priority": "low", "tips": ["Read daily"]}"#)
        });

        let service = service(mock).with_cache(Arc::new(MapCache::default()));

        let first = service.suggest("Read a chapter").await.unwrap();
        let second = service.suggest("  read a CHAPTER ").await.unwrap();

        assert_eq!(first, second);
        let stats = service.stats();
        assert_eq!(stats.cache_hits, 1);
        assert_eq!(stats.model_results, 2);
    }

    #[tokio::test]
    async fn fallback_results_are_not_cached() {
        let mut mock = enabled_mock();
        mock.expect_invoke()
            .times(2)
            .returning(|_| Err(ApplicationError::FatalInference("404".into())));

        let service = service(mock).with_cache(Arc::new(MapCache::default()));

        service.suggest("Water the garden").await.unwrap();
        service.suggest("Water the garden").await.unwrap();
        assert_eq!(service.stats().cache_hits, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn limiter_serializes_invocations() {
        let mut scripted = ScriptedInference::failing(0, ApplicationError::Cancelled);
        scripted.delay = Duration::from_millis(100);
        let inference = Arc::new(scripted);
        let config = SuggestionServiceConfig {
            max_concurrent_invocations: Some(1),
            ..SuggestionServiceConfig::default()
        };
        let service =
            SuggestionService::new(Arc::clone(&inference) as Arc<dyn InferencePort>, config);

        let started = tokio::time::Instant::now();
        let (a, b) = tokio::join!(service.suggest("Email the boss"), service.suggest("Call mom"));

        assert!(a.is_ok() && b.is_ok());
        assert_eq!(inference.calls(), 2);
        assert_eq!(started.elapsed(), Duration::from_millis(200));
    }

    #[test]
    fn cache_keys_normalize_text_and_separate_modes() {
        let mut mock = MockInferencePort::new();
        mock.expect_current_model()
            .return_const("test-model".to_string());
        let service = service(mock);
        let settings = ResolvedSettings {
            model: None,
            max_tokens: 200,
            temperature: 0.3,
        };
        let a = SuggestionRequest::new("Buy milk").unwrap();
        let b = SuggestionRequest::new("  BUY MILK").unwrap();

        assert_eq!(
            service.cache_key(PromptMode::Suggest, &a, &settings),
            service.cache_key(PromptMode::Suggest, &b, &settings)
        );
        assert_ne!(
            service.cache_key(PromptMode::Suggest, &a, &settings),
            service.cache_key(PromptMode::Parse, &a, &settings)
        );

        let warmer = ResolvedSettings {
            temperature: 0.7,
            ..settings.clone()
        };
        assert_ne!(
            service.cache_key(PromptMode::Suggest, &a, &settings),
            service.cache_key(PromptMode::Suggest, &a, &warmer)
        );
    }

    #[test]
    fn fallback_rate() {
        let stats = SuggestionStats {
            model_results: 3,
            fallback_results: 1,
            ..SuggestionStats::default()
        };
        assert!((stats.fallback_rate() - 0.25).abs() < f64::EPSILON);
        assert!(SuggestionStats::default().fallback_rate().abs() < f64::EPSILON);
    }
}
