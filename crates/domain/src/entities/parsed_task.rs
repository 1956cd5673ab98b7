//! Structured task extracted from natural language

use serde::{Deserialize, Serialize};

use crate::value_objects::{Category, Source};

/// Title, description and category pulled out of free text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedTask {
    pub title: String,
    /// Empty when the input held nothing beyond the title
    pub description: String,
    pub category: Category,
    pub source: Source,
}

impl ParsedTask {
    #[must_use]
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        category: Category,
        source: Source,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            category,
            source,
        }
    }

    #[must_use]
    pub const fn is_fallback(&self) -> bool {
        self.source.is_fallback()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_expected_shape() {
        let task = ParsedTask::new("Call John", "", Category::Work, Source::Model);
        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["title"], "Call John");
        assert_eq!(json["description"], "");
        assert_eq!(json["category"], "Work");
        assert_eq!(json["source"], "model");
    }
}
