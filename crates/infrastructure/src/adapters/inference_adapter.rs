//! Inference adapter - implements `InferencePort` on top of an ai_core engine
//!
//! Provider failures are sorted into transient and fatal application errors
//! here, so the suggestion service only ever reasons about those two kinds.

use std::sync::Arc;
use std::time::Instant;

use ai_core::{InferenceConfig, InferenceEngine, InferenceError, InferenceRequest, build_engine};
use application::{ApplicationError, InferencePort, InferenceResult, InvocationRequest};
use async_trait::async_trait;
use tracing::{debug, info, instrument, warn};

/// Adapter for any remote provider engine
pub struct EngineInferenceAdapter {
    engine: Arc<dyn InferenceEngine>,
}

impl std::fmt::Debug for EngineInferenceAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineInferenceAdapter")
            .field("provider", &self.engine.provider_name())
            .field("model", &self.engine.default_model())
            .finish()
    }
}

impl EngineInferenceAdapter {
    pub fn new(engine: Arc<dyn InferenceEngine>) -> Self {
        Self { engine }
    }

    /// Convert an ai_core error into an application error
    pub fn map_error(e: &InferenceError) -> ApplicationError {
        if e.is_transient() {
            ApplicationError::TransientInference(e.to_string())
        } else {
            ApplicationError::FatalInference(e.to_string())
        }
    }
}

#[async_trait]
impl InferencePort for EngineInferenceAdapter {
    #[instrument(
        skip(self, request),
        fields(provider = self.engine.provider_name(), prompt_len = request.prompt.len())
    )]
    async fn invoke(
        &self,
        request: &InvocationRequest,
    ) -> Result<InferenceResult, ApplicationError> {
        let start = Instant::now();

        let mut engine_request =
            InferenceRequest::with_system(&request.system_prompt, &request.prompt)
                .with_max_tokens(request.max_tokens)
                .with_temperature(request.temperature);
        if let Some(model) = &request.model_id {
            engine_request = engine_request.with_model(model);
        }

        let response = self.engine.generate(engine_request).await.map_err(|e| {
            if e.is_rate_limited() {
                debug!(error = %e, "Provider rate limited the request");
            }
            Self::map_error(&e)
        })?;

        #[allow(clippy::cast_possible_truncation)]
        let latency_ms = start.elapsed().as_millis() as u64;

        debug!(
            model = %response.model,
            latency_ms,
            response_len = response.content.len(),
            "Inference completed"
        );

        Ok(InferenceResult {
            content: response.content,
            model: response.model,
            tokens_used: response.usage.map(|usage| usage.total_tokens),
            latency_ms,
        })
    }

    async fn is_healthy(&self) -> bool {
        match self.engine.health_check().await {
            Ok(healthy) => healthy,
            Err(e) => {
                warn!(error = %e, "Inference health check failed");
                false
            },
        }
    }

    fn current_model(&self) -> String {
        self.engine.default_model().to_string()
    }
}

/// Stand-in used when remote inference is switched off
///
/// Every invocation fails fatally; the service checks
/// [`InferencePort::is_enabled`] first and never calls it.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledInference;

#[async_trait]
impl InferencePort for DisabledInference {
    async fn invoke(
        &self,
        _request: &InvocationRequest,
    ) -> Result<InferenceResult, ApplicationError> {
        Err(ApplicationError::FatalInference(
            "Remote inference is disabled".to_string(),
        ))
    }

    async fn is_healthy(&self) -> bool {
        false
    }

    fn current_model(&self) -> String {
        "rules".to_string()
    }

    fn is_enabled(&self) -> bool {
        false
    }
}

/// Build the inference port described by `config`
pub fn build_inference_port(
    config: &InferenceConfig,
) -> Result<Arc<dyn InferencePort>, ApplicationError> {
    let engine = build_engine(config)
        .map_err(|e| ApplicationError::Configuration(format!("Inference engine: {e}")))?;

    Ok(match engine {
        Some(engine) => {
            info!(
                provider = engine.provider_name(),
                model = engine.default_model(),
                "Remote inference enabled"
            );
            Arc::new(EngineInferenceAdapter::new(engine))
        },
        None => Arc::new(DisabledInference),
    })
}
