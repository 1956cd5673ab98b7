//! Result cache configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::default_true;

/// In-memory result cache settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Whether model results are cached
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Time-to-live for cached results in seconds (default: 1 hour)
    #[serde(default = "default_ttl")]
    pub ttl_secs: u64,

    /// Maximum number of cached results
    #[serde(default = "default_max_entries")]
    pub max_entries: u64,
}

const fn default_ttl() -> u64 {
    60 * 60
}

const fn default_max_entries() -> u64 {
    10_000
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_secs: default_ttl(),
            max_entries: default_max_entries(),
        }
    }
}

impl CacheConfig {
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}
