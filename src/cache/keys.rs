//! Cache key definitions.
//!
//! Every byte-cache entry is addressed by a namespaced string combining a tier
//! tag with the level id or the canonical read path.

use std::fmt;

/// Canonical read path of the listing endpoint. Shared by every listing
/// response, so one eviction clears it.
pub const LIST_ALL_PATH: &str = "query:all@levels";

const LEVELS_ROUTE: &str = "/levels";

/// Which cache tier a key belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheTier {
    /// Finalized merged level views.
    Level,
    /// Served responses keyed by read path.
    Response,
}

impl CacheTier {
    pub fn as_str(self) -> &'static str {
        match self {
            CacheTier::Level => "level",
            CacheTier::Response => "response",
        }
    }
}

/// Byte-cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// Merged view of one level.
    Level(String),
    /// Response produced for a canonical read path.
    Response(String),
}

impl CacheKey {
    pub fn level(id: impl Into<String>) -> Self {
        Self::Level(id.into())
    }

    /// Response entry for a single level read.
    pub fn level_response(id: &str) -> Self {
        Self::Response(level_path(id))
    }

    /// Response entry for the list-all read.
    pub fn listing_response() -> Self {
        Self::Response(LIST_ALL_PATH.to_string())
    }

    pub fn tier(&self) -> CacheTier {
        match self {
            CacheKey::Level(_) => CacheTier::Level,
            CacheKey::Response(_) => CacheTier::Response,
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheKey::Level(id) => write!(f, "level:{id}"),
            CacheKey::Response(path) => write!(f, "response:{path}"),
        }
    }
}

/// Canonical read path of a single level.
pub fn level_path(id: &str) -> String {
    format!("{LEVELS_ROUTE}/{id}")
}
