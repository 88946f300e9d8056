//! Cache configuration.
//!
//! Controls the level (merged view) cache and the response cache via the
//! `[cache]` section of `levelkeep.toml`.

use std::num::NonZeroUsize;

use serde::Deserialize;

use super::keys::CacheTier;

const DEFAULT_CAPACITY: usize = 1024;

/// Cache configuration from `levelkeep.toml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Cache merged level views.
    pub enable_level_cache: bool,
    /// Cache served responses (single level reads and the listing).
    pub enable_response_cache: bool,
    /// Maximum entries held by the in-process byte cache before LRU eviction.
    pub capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enable_level_cache: true,
            enable_response_cache: true,
            capacity: DEFAULT_CAPACITY,
        }
    }
}

impl CacheConfig {
    pub fn tier_enabled(&self, tier: CacheTier) -> bool {
        match tier {
            CacheTier::Level => self.enable_level_cache,
            CacheTier::Response => self.enable_response_cache,
        }
    }

    /// Returns the capacity as NonZeroUsize, clamping to 1 if zero.
    pub fn capacity_non_zero(&self) -> NonZeroUsize {
        NonZeroUsize::new(self.capacity).unwrap_or(NonZeroUsize::MIN)
    }
}
