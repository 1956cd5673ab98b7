//! Result provenance

use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a suggestion or parsed task came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    /// Produced by remote inference and validated
    Model,
    /// Produced by the local rule engine
    Fallback,
}

impl Source {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Model => "model",
            Self::Fallback => "fallback",
        }
    }

    #[must_use]
    pub const fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback)
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Source::Model).unwrap(), "\"model\"");
        assert_eq!(
            serde_json::to_string(&Source::Fallback).unwrap(),
            "\"fallback\""
        );
    }

    #[test]
    fn is_fallback() {
        assert!(Source::Fallback.is_fallback());
        assert!(!Source::Model.is_fallback());
        assert_eq!(Source::Fallback.to_string(), "fallback");
    }
}
