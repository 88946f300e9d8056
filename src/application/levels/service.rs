//! Read and write entry points for levels.
//!
//! Reads go through the response cache first. Writes hit the store and then
//! run the invalidation cascade before returning.

use std::sync::Arc;

use serde_json::Value;
use tracing::{info, instrument};

use crate::application::error::{AppError, STATUS_NOT_FOUND, STATUS_OK};
use crate::application::repos::LevelStore;
use crate::cache::{CacheKey, CachedResponse, ItemCache, LIST_ALL_PATH, level_path};
use crate::domain::{Level, LevelPayload};

use super::invalidation::{InvalidationCoordinator, InvalidationReport};
use super::listing::LevelCollection;
use super::resolver::LevelResolver;

const SOURCE: &str = "application::levels::LevelService";

/// Status plus JSON body, as handed to the transport.
#[derive(Debug, Clone, PartialEq)]
pub struct ServedResponse {
    pub status: u16,
    pub body: Value,
}

impl ServedResponse {
    pub fn ok(body: Value) -> Self {
        Self {
            status: STATUS_OK,
            body,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == STATUS_OK
    }

    fn from_error(err: &AppError) -> Self {
        err.report(SOURCE).log();
        Self {
            status: err.status_code(),
            body: Value::String(err.presentation_message().to_string()),
        }
    }
}

impl From<CachedResponse> for ServedResponse {
    fn from(cached: CachedResponse) -> Self {
        Self {
            status: cached.status,
            body: cached.body,
        }
    }
}

#[derive(Clone)]
pub struct LevelService {
    store: Arc<dyn LevelStore>,
    cache: ItemCache,
    resolver: LevelResolver,
    invalidation: InvalidationCoordinator,
    collection: LevelCollection,
}

impl LevelService {
    pub fn new(store: Arc<dyn LevelStore>, cache: ItemCache, page_limit: u32) -> Self {
        let resolver = LevelResolver::new(store.clone(), cache.clone());
        let invalidation = InvalidationCoordinator::new(store.clone(), cache.clone());
        let collection = LevelCollection::new(store.clone(), resolver.clone(), page_limit);
        Self {
            store,
            cache,
            resolver,
            invalidation,
            collection,
        }
    }

    pub fn resolver(&self) -> &LevelResolver {
        &self.resolver
    }

    pub fn invalidation(&self) -> &InvalidationCoordinator {
        &self.invalidation
    }

    pub fn collection(&self) -> &LevelCollection {
        &self.collection
    }

    /// Serve the merged view of one level. Successful and not-found
    /// responses are cached under the level's read path.
    #[instrument(skip(self))]
    pub async fn get_level(&self, id: &str) -> ServedResponse {
        let path = level_path(id);
        if let Some(cached) = self
            .cache
            .fetch::<CachedResponse>(&CacheKey::Response(path.clone()))
            .await
        {
            return cached.into();
        }

        let result = self
            .resolver
            .resolve(id)
            .await
            .map_err(AppError::from)
            .and_then(|level| encode(&level));

        match result {
            Ok(body) => self.remember(path, ServedResponse::ok(body)).await,
            Err(err) if err.status_code() == STATUS_NOT_FOUND => {
                self.remember(path, ServedResponse::from_error(&err)).await
            }
            Err(err) => ServedResponse::from_error(&err),
        }
    }

    /// Serve the merged views of the collection, up to the page limit.
    #[instrument(skip(self))]
    pub async fn list_levels(&self) -> ServedResponse {
        if let Some(cached) = self
            .cache
            .fetch::<CachedResponse>(&CacheKey::listing_response())
            .await
        {
            return cached.into();
        }

        let result = self
            .collection
            .list_all(self.collection.page_limit())
            .await
            .map_err(AppError::from)
            .and_then(|levels| encode(&levels));

        match result {
            Ok(body) => {
                self.remember(LIST_ALL_PATH.to_string(), ServedResponse::ok(body))
                    .await
            }
            Err(err) => ServedResponse::from_error(&err),
        }
    }

    /// Replace the level stored under `id`. The id is taken from the caller,
    /// never from the payload.
    #[instrument(skip(self, payload))]
    pub async fn put_level(&self, id: &str, payload: LevelPayload) -> ServedResponse {
        let level = match Level::from_payload(id, payload) {
            Ok(level) => level,
            Err(err) => return ServedResponse::from_error(&AppError::from(err)),
        };

        if let Err(err) = self.store.put(&level).await {
            return ServedResponse::from_error(&AppError::from(err));
        }

        let report = self.invalidation.invalidate(id).await;
        info!(report = %report, "level stored");
        ServedResponse::ok(Value::Null)
    }

    /// Delete the level stored under `id`. Deleting a missing level succeeds.
    /// Children are left in place and become unresolvable until re-parented.
    #[instrument(skip(self))]
    pub async fn delete_level(&self, id: &str) -> ServedResponse {
        if let Err(err) = self.store.delete(id).await {
            return ServedResponse::from_error(&AppError::from(err));
        }

        let report = self.invalidation.invalidate(id).await;
        info!(report = %report, "level deleted");
        ServedResponse::ok(Value::Null)
    }

    /// Run the cascade for `id` without touching the store.
    pub async fn invalidate(&self, id: &str) -> InvalidationReport {
        self.invalidation.invalidate(id).await
    }

    async fn remember(&self, path: String, response: ServedResponse) -> ServedResponse {
        let cached = CachedResponse {
            path,
            status: response.status,
            body: response.body,
        };
        self.cache.store(&cached).await;
        cached.into()
    }
}

fn encode<T: serde::Serialize>(value: &T) -> Result<Value, AppError> {
    serde_json::to_value(value)
        .map_err(|err| AppError::unexpected(format!("failed to encode response: {err}")))
}
