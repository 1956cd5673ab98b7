//! Cache implementations
//!
//! `MokaCache` is the in-memory result cache behind the application's
//! `CachePort`.

mod moka_cache;

pub use moka_cache::{MokaCache, MokaCacheConfig};
