//! Suggestion request and result

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::errors::DomainError;
use crate::value_objects::{Category, Priority, Source};

/// Upper bound on tips carried by a [`SuggestionResult`]
pub const MAX_TIPS: usize = 5;

/// Per-call override of the configured model settings
///
/// Unset fields fall back to the service configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelOverride {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

impl ModelOverride {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.model.is_none() && self.max_tokens.is_none() && self.temperature.is_none()
    }
}

/// A free-text task to classify
///
/// Construction fails for empty or whitespace-only text, so every value of
/// this type is safe to hand to the suggestion engine. Build it through
/// [`SuggestionRequest::new`]; there is no `Deserialize` impl.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuggestionRequest {
    text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    due_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    model_override: Option<ModelOverride>,
}

impl SuggestionRequest {
    /// Create a request, rejecting blank text
    pub fn new(text: impl Into<String>) -> Result<Self, DomainError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(DomainError::EmptyTaskText);
        }
        Ok(Self {
            text,
            description: None,
            due_date: None,
            model_override: None,
        })
    }

    /// Attach a longer description; blank descriptions are dropped
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        let description = description.into();
        self.description = (!description.trim().is_empty()).then_some(description);
        self
    }

    #[must_use]
    pub fn with_due_date(mut self, due_date: NaiveDate) -> Self {
        self.due_date = Some(due_date);
        self
    }

    #[must_use]
    pub fn with_model_override(mut self, model_override: ModelOverride) -> Self {
        self.model_override = (!model_override.is_empty()).then_some(model_override);
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub const fn due_date(&self) -> Option<NaiveDate> {
        self.due_date
    }

    pub const fn model_override(&self) -> Option<&ModelOverride> {
        self.model_override.as_ref()
    }

    /// Text used for keyword classification: the task text followed by the
    /// description, if any
    pub fn classification_text(&self) -> String {
        match &self.description {
            Some(description) => format!("{} {}", self.text, description),
            None => self.text.clone(),
        }
    }
}

/// Structured suggestion for a task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestionResult {
    pub category: Category,
    pub priority: Priority,
    pub tips: Vec<String>,
    pub source: Source,
}

impl SuggestionResult {
    /// Build a result, keeping at most [`MAX_TIPS`] tips
    #[must_use]
    pub fn new(category: Category, priority: Priority, mut tips: Vec<String>, source: Source) -> Self {
        tips.truncate(MAX_TIPS);
        Self {
            category,
            priority,
            tips,
            source,
        }
    }

    #[must_use]
    pub const fn is_fallback(&self) -> bool {
        self.source.is_fallback()
    }
}
