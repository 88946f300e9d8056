//! levelkeep cache system
//!
//! Two logical tiers share one byte cache:
//!
//! - **Level cache**: finalized merged views, keyed `level:{id}`
//! - **Response cache**: served responses, keyed `response:{path}`
//!
//! ## Configuration
//!
//! ```toml
//! [cache]
//! enable_level_cache = true
//! enable_response_cache = true
//! capacity = 1024
//! ```
//!
//! Entries have no expiry. They are created lazily on read and removed by
//! the invalidation cascade in `application::levels`.

mod config;
mod item;
mod keys;
mod lock;
mod response;
mod store;

pub use config::CacheConfig;
pub use item::{CacheItem, ItemCache};
pub use keys::{CacheKey, CacheTier, LIST_ALL_PATH, level_path};
pub use response::CachedResponse;
pub use store::{ByteCache, CacheError, LruByteCache};
