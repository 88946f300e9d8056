//! Response cache entries.

use serde::{Deserialize, Serialize};

use super::item::CacheItem;
use super::keys::CacheKey;

/// A served response (status code plus JSON body) keyed by its canonical
/// read path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedResponse {
    pub path: String,
    pub status: u16,
    pub body: serde_json::Value,
}

impl CacheItem for CachedResponse {
    fn cache_key(&self) -> CacheKey {
        CacheKey::Response(self.path.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::keys::LIST_ALL_PATH;

    #[test]
    fn keyed_by_path() {
        let response = CachedResponse {
            path: LIST_ALL_PATH.to_string(),
            status: 200,
            body: serde_json::json!([]),
        };
        assert_eq!(response.cache_key(), CacheKey::listing_response());
    }

    #[test]
    fn not_found_body_survives_encoding() {
        let response = CachedResponse {
            path: "/levels/missing".to_string(),
            status: 404,
            body: serde_json::Value::String("Level does not exist".into()),
        };
        let bytes = response.to_bytes().expect("encode");
        let decoded =
            CachedResponse::from_bytes(&response.cache_key(), &bytes).expect("decode");
        assert_eq!(decoded, response);
    }
}
