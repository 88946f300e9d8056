//! Byte cache contract and the in-process LRU implementation.
//!
//! The contract mirrors a memcache-style service: opaque values, no ordering,
//! no durability, and a `get` may miss right after a `set`.

use std::sync::RwLock;

use async_trait::async_trait;
use bytes::Bytes;
use lru::LruCache;
use metrics::counter;
use thiserror::Error;

use super::config::CacheConfig;
use super::lock::{rw_read, rw_write};

const METRIC_CACHE_EVICT_TOTAL: &str = "levelkeep_cache_evict_total";

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache backend failure: {0}")]
    Backend(String),
    #[error("failed to encode cache entry `{key}`: {message}")]
    Encode { key: String, message: String },
    #[error("failed to decode cache entry `{key}`: {message}")]
    Decode { key: String, message: String },
}

impl CacheError {
    pub fn backend(err: impl std::fmt::Display) -> Self {
        Self::Backend(err.to_string())
    }
}

/// Opaque key to byte-blob cache.
///
/// Every failure is non-fatal to callers: a failed `get` is a miss and a
/// failed `set` or `delete` is a no-op. Deleting a missing key is not an
/// error.
#[async_trait]
pub trait ByteCache: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Bytes>, CacheError>;

    async fn set(&self, key: &str, value: Bytes) -> Result<(), CacheError>;

    async fn delete(&self, key: &str) -> Result<(), CacheError>;
}

/// In-process byte cache with LRU eviction.
///
/// Capacity eviction stands in for the memory pressure of a shared cache
/// service; entries carry no expiry.
pub struct LruByteCache {
    entries: RwLock<LruCache<String, Bytes>>,
}

impl LruByteCache {
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            entries: RwLock::new(LruCache::new(config.capacity_non_zero())),
        }
    }

    /// Whether `key` is present, without touching recency.
    pub fn contains(&self, key: &str) -> bool {
        rw_read(&self.entries, "contains").contains(key)
    }

    /// Get the number of cached entries.
    pub fn len(&self) -> usize {
        rw_read(&self.entries, "len").len()
    }

    /// Check if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ByteCache for LruByteCache {
    async fn get(&self, key: &str) -> Result<Option<Bytes>, CacheError> {
        Ok(rw_write(&self.entries, "get").get(key).cloned())
    }

    async fn set(&self, key: &str, value: Bytes) -> Result<(), CacheError> {
        let evicted = rw_write(&self.entries, "set").push(key.to_string(), value);
        if let Some((evicted_key, _)) = evicted
            && evicted_key != key
        {
            counter!(METRIC_CACHE_EVICT_TOTAL).increment(1);
            tracing::debug!(evicted = %evicted_key, "byte cache evicted entry at capacity");
        }
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        rw_write(&self.entries, "delete").pop(key);
        Ok(())
    }
}
