//! Typed access to the byte cache.
//!
//! Anything that can name its own cache key and round-trip through JSON can
//! be cached. Cache failures never reach callers: a failed or undecodable
//! read is a miss and a failed write or delete is logged and dropped.

use std::sync::Arc;

use bytes::Bytes;
use metrics::counter;
use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, warn};

use crate::domain::Level;

use super::config::CacheConfig;
use super::keys::CacheKey;
use super::store::{ByteCache, CacheError};

const METRIC_CACHE_HIT_TOTAL: &str = "levelkeep_cache_hit_total";
const METRIC_CACHE_MISS_TOTAL: &str = "levelkeep_cache_miss_total";
const METRIC_CACHE_ERROR_TOTAL: &str = "levelkeep_cache_error_total";

/// A value that can live in the byte cache.
pub trait CacheItem: Serialize + DeserializeOwned + Send + Sync {
    fn cache_key(&self) -> CacheKey;

    fn to_bytes(&self) -> Result<Bytes, CacheError> {
        serde_json::to_vec(self)
            .map(Bytes::from)
            .map_err(|err| CacheError::Encode {
                key: self.cache_key().to_string(),
                message: err.to_string(),
            })
    }

    fn from_bytes(key: &CacheKey, bytes: &[u8]) -> Result<Self, CacheError> {
        serde_json::from_slice(bytes).map_err(|err| CacheError::Decode {
            key: key.to_string(),
            message: err.to_string(),
        })
    }
}

impl CacheItem for Level {
    fn cache_key(&self) -> CacheKey {
        CacheKey::level(self.id.clone())
    }
}

/// Byte cache plus the per-tier switches from [`CacheConfig`].
#[derive(Clone)]
pub struct ItemCache {
    config: CacheConfig,
    backend: Arc<dyn ByteCache>,
}

impl ItemCache {
    pub fn new(config: CacheConfig, backend: Arc<dyn ByteCache>) -> Self {
        Self { config, backend }
    }

    /// Look up and decode an item. Every failure degrades to `None`.
    pub async fn fetch<T: CacheItem>(&self, key: &CacheKey) -> Option<T> {
        let tier = key.tier();
        if !self.config.tier_enabled(tier) {
            return None;
        }

        let storage_key = key.to_string();
        let bytes = match self.backend.get(&storage_key).await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => {
                debug!(
                    cache = tier.as_str(),
                    outcome = "miss",
                    key = %storage_key,
                    "cache lookup"
                );
                counter!(METRIC_CACHE_MISS_TOTAL, "tier" => tier.as_str()).increment(1);
                return None;
            }
            Err(err) => {
                warn!(
                    cache = tier.as_str(),
                    key = %storage_key,
                    error = %err,
                    "cache read failed; treating as miss"
                );
                counter!(METRIC_CACHE_ERROR_TOTAL, "op" => "get").increment(1);
                counter!(METRIC_CACHE_MISS_TOTAL, "tier" => tier.as_str()).increment(1);
                return None;
            }
        };

        match T::from_bytes(key, &bytes) {
            Ok(item) => {
                debug!(
                    cache = tier.as_str(),
                    outcome = "hit",
                    key = %storage_key,
                    "cache lookup"
                );
                counter!(METRIC_CACHE_HIT_TOTAL, "tier" => tier.as_str()).increment(1);
                Some(item)
            }
            Err(err) => {
                warn!(
                    cache = tier.as_str(),
                    error = %err,
                    "malformed cache entry; treating as miss"
                );
                counter!(METRIC_CACHE_ERROR_TOTAL, "op" => "decode").increment(1);
                counter!(METRIC_CACHE_MISS_TOTAL, "tier" => tier.as_str()).increment(1);
                self.evict(key).await;
                None
            }
        }
    }

    /// Encode and store an item under its own key.
    pub async fn store<T: CacheItem>(&self, item: &T) {
        let key = item.cache_key();
        if !self.config.tier_enabled(key.tier()) {
            return;
        }

        let result = match item.to_bytes() {
            Ok(bytes) => self.backend.set(&key.to_string(), bytes).await,
            Err(err) => Err(err),
        };

        if let Err(err) = result {
            warn!(key = %key, error = %err, "cache write failed; entry not cached");
            counter!(METRIC_CACHE_ERROR_TOTAL, "op" => "set").increment(1);
        }
    }

    /// Delete an entry. Runs even when the tier is disabled so that toggling a
    /// tier off and on again cannot resurrect a stale entry.
    pub async fn evict(&self, key: &CacheKey) {
        if let Err(err) = self.backend.delete(&key.to_string()).await {
            warn!(key = %key, error = %err, "cache delete failed; entry may be stale");
            counter!(METRIC_CACHE_ERROR_TOTAL, "op" => "delete").increment(1);
        }
    }
}
