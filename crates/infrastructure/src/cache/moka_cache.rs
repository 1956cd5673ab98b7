//! In-memory result cache on moka
//!
//! Entries expire individually: each one keeps the TTL it was stored with,
//! capped by [`MokaCacheConfig::max_ttl`].

use std::sync::Arc;
use std::time::{Duration, Instant};

use application::{ApplicationError, CachePort};
use async_trait::async_trait;
use moka::Expiry;
use moka::future::Cache;
use tracing::{instrument, trace};

use crate::config::CacheConfig;

/// Sizing and lifetime limits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MokaCacheConfig {
    pub max_entries: u64,
    /// Longest lifetime any entry may have
    pub max_ttl: Duration,
}

impl Default for MokaCacheConfig {
    fn default() -> Self {
        Self::from(&CacheConfig::default())
    }
}

impl From<&CacheConfig> for MokaCacheConfig {
    fn from(config: &CacheConfig) -> Self {
        Self {
            max_entries: config.max_entries,
            max_ttl: config.ttl(),
        }
    }
}

#[derive(Debug, Clone)]
struct Entry {
    json: Arc<str>,
    ttl: Duration,
}

/// Expiry policy reading the TTL off each entry
struct PerEntryTtl;

impl Expiry<String, Entry> for PerEntryTtl {
    fn expire_after_create(&self, _key: &String, entry: &Entry, _created_at: Instant) -> Option<Duration> {
        Some(entry.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        entry: &Entry,
        _updated_at: Instant,
        _remaining: Option<Duration>,
    ) -> Option<Duration> {
        Some(entry.ttl)
    }
}

/// Bounded in-memory [`CachePort`]
pub struct MokaCache {
    entries: Cache<String, Entry>,
    max_ttl: Duration,
}

impl std::fmt::Debug for MokaCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MokaCache")
            .field("entries", &self.entries.entry_count())
            .field("max_ttl", &self.max_ttl)
            .finish()
    }
}

impl MokaCache {
    #[must_use]
    pub fn with_config(config: MokaCacheConfig) -> Self {
        Self {
            entries: Cache::builder()
                .max_capacity(config.max_entries)
                .expire_after(PerEntryTtl)
                .build(),
            max_ttl: config.max_ttl,
        }
    }

    /// Approximate number of live entries
    pub fn entry_count(&self) -> u64 {
        self.entries.entry_count()
    }
}

impl Default for MokaCache {
    fn default() -> Self {
        Self::with_config(MokaCacheConfig::default())
    }
}

#[async_trait]
impl CachePort for MokaCache {
    #[instrument(skip(self), level = "trace")]
    async fn load(&self, key: &str) -> Result<Option<String>, ApplicationError> {
        let entry = self.entries.get(key).await;
        trace!(hit = entry.is_some(), "Cache lookup");
        Ok(entry.map(|e| e.json.to_string()))
    }

    #[instrument(skip(self, json), level = "trace")]
    async fn store(&self, key: &str, json: String, ttl: Duration) -> Result<(), ApplicationError> {
        let ttl = ttl.min(self.max_ttl);
        if ttl.is_zero() {
            return Ok(());
        }
        self.entries
            .insert(key.to_string(), Entry { json: json.into(), ttl })
            .await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use application::CachePortExt;
    use domain::{Category, Priority, Source, SuggestionResult};

    use super::*;

    fn cache(max_ttl: Duration) -> MokaCache {
        MokaCache::with_config(MokaCacheConfig {
            max_entries: 100,
            max_ttl,
        })
    }

    #[tokio::test]
    async fn missing_key_is_none() {
        assert!(MokaCache::default().load("absent").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn stored_json_is_returned() {
        let cache = MokaCache::default();
        cache
            .store("k", "{\"a\":1}".to_string(), Duration::from_secs(60))
            .await
            .unwrap();

        assert_eq!(cache.load("k").await.unwrap().as_deref(), Some("{\"a\":1}"));
    }

    #[tokio::test]
    async fn entries_expire_after_their_own_ttl() {
        let cache = cache(Duration::from_secs(60));
        cache
            .store("short", "1".to_string(), Duration::from_millis(50))
            .await
            .unwrap();
        cache
            .store("long", "2".to_string(), Duration::from_secs(60))
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(200)).await;

        assert!(cache.load("short").await.unwrap().is_none());
        assert_eq!(cache.load("long").await.unwrap().as_deref(), Some("2"));
    }

    #[tokio::test]
    async fn ttl_is_capped_by_config() {
        let cache = cache(Duration::from_millis(50));
        cache
            .store("k", "1".to_string(), Duration::from_secs(3600))
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(200)).await;

        assert!(cache.load("k").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn zero_ttl_stores_nothing() {
        let cache = MokaCache::default();
        cache.store("k", "1".to_string(), Duration::ZERO).await.unwrap();
        assert!(cache.load("k").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn suggestion_results_round_trip() {
        let cache = MokaCache::default();
        let result = SuggestionResult::new(
            Category::Finance,
            Priority::High,
            vec!["Pay before Friday".to_string()],
            Source::Model,
        );

        cache
            .put_json("suggest:abc", &result, Duration::from_secs(60))
            .await
            .unwrap();
        let cached: Option<SuggestionResult> = cache.get_json("suggest:abc").await.unwrap();
        assert_eq!(cached, Some(result));
    }

    #[test]
    fn config_from_app_cache_section() {
        let config = MokaCacheConfig::from(&CacheConfig {
            enabled: true,
            ttl_secs: 120,
            max_entries: 50,
        });
        assert_eq!(config.max_ttl, Duration::from_secs(120));
        assert_eq!(config.max_entries, 50);
    }
}
