//! Collection listing: enumerate ids, then resolve each one.

use std::sync::Arc;

use tracing::{instrument, warn};

use crate::application::repos::{LevelStore, RepoError};
use crate::domain::Level;

use super::resolver::LevelResolver;

/// Page limit applied when none is configured.
pub const DEFAULT_PAGE_LIMIT: u32 = 100;

/// Enumerates the collection and resolves each member.
#[derive(Clone)]
pub struct LevelCollection {
    store: Arc<dyn LevelStore>,
    resolver: LevelResolver,
    page_limit: u32,
}

impl LevelCollection {
    pub fn new(store: Arc<dyn LevelStore>, resolver: LevelResolver, page_limit: u32) -> Self {
        Self {
            store,
            resolver,
            page_limit: page_limit.max(1),
        }
    }

    pub fn page_limit(&self) -> u32 {
        self.page_limit
    }

    /// Merged views of up to `limit` levels, in store order.
    ///
    /// `limit` is clamped to the page limit. A level that fails to resolve
    /// is left out of the result; only the id enumeration itself can fail.
    #[instrument(skip(self))]
    pub async fn list_all(&self, limit: u32) -> Result<Vec<Level>, RepoError> {
        let limit = limit.min(self.page_limit);
        let ids = self.store.query_all(limit).await?;

        let mut levels = Vec::with_capacity(ids.len());
        for id in ids.into_iter().take(limit as usize) {
            match self.resolver.resolve(&id).await {
                Ok(level) => levels.push(level),
                Err(err) => {
                    warn!(id = %id, error = %err, "skipping unresolvable level in listing");
                }
            }
        }
        Ok(levels)
    }
}
