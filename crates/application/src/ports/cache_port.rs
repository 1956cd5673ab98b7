//! Result cache port
//!
//! The suggestion service stores accepted model results as JSON text keyed
//! by a request fingerprint. Backends only move strings around.

use std::fmt::Debug;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::ApplicationError;

/// Storage for cached model results
#[async_trait]
pub trait CachePort: Send + Sync + Debug {
    /// Stored JSON for `key`, or `None` when absent or expired
    async fn load(&self, key: &str) -> Result<Option<String>, ApplicationError>;

    /// Store `json` under `key` until `ttl` elapses
    async fn store(&self, key: &str, json: String, ttl: Duration) -> Result<(), ApplicationError>;
}

/// Typed access on top of any [`CachePort`]
#[async_trait]
pub trait CachePortExt: CachePort {
    async fn get_json<T>(&self, key: &str) -> Result<Option<T>, ApplicationError>
    where
        T: DeserializeOwned + Send,
    {
        let Some(json) = self.load(key).await? else {
            return Ok(None);
        };
        serde_json::from_str(&json)
            .map(Some)
            .map_err(|e| ApplicationError::Internal(format!("Corrupt cache entry {key}: {e}")))
    }

    async fn put_json<T>(&self, key: &str, value: &T, ttl: Duration) -> Result<(), ApplicationError>
    where
        T: Serialize + Send + Sync,
    {
        let json = serde_json::to_string(value)
            .map_err(|e| ApplicationError::Internal(format!("Unserializable cache entry: {e}")))?;
        self.store(key, json, ttl).await
    }
}

impl<C: CachePort + ?Sized> CachePortExt for C {}
