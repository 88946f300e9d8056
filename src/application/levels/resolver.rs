use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, instrument};

use crate::application::repos::LevelStore;
use crate::cache::{CacheKey, ItemCache};
use crate::domain::Level;

use super::ResolveError;

/// Produces merged level views, walking the parent chain only as far as
/// some property is still unset.
#[derive(Clone)]
pub struct LevelResolver {
    store: Arc<dyn LevelStore>,
    cache: ItemCache,
}

impl LevelResolver {
    pub fn new(store: Arc<dyn LevelStore>, cache: ItemCache) -> Self {
        Self { store, cache }
    }

    /// Resolve the merged view of `id`.
    ///
    /// A cached view is returned as is. Otherwise the raw records are loaded
    /// from the store down to the first ancestor that is cached, complete, or
    /// parentless, and folded back up. Every view computed on the way is
    /// cached under its own id. Negative results are never cached here.
    #[instrument(skip(self))]
    pub async fn resolve(&self, id: &str) -> Result<Level, ResolveError> {
        let mut chain: Vec<Level> = Vec::new();
        let mut visited: HashSet<String> = HashSet::new();
        let mut base: Option<Level> = None;
        let mut current = id.to_string();

        loop {
            if !visited.insert(current.clone()) {
                return Err(ResolveError::CycleDetected { id: current });
            }

            if let Some(cached) = self.cache.fetch::<Level>(&CacheKey::level(&current)).await {
                base = Some(cached);
                break;
            }

            let level = self
                .store
                .get(&current)
                .await?
                .ok_or_else(|| ResolveError::NotFound { id: current.clone() })?;

            let next = if level.needs_ancestor() {
                level.parent.clone()
            } else {
                None
            };
            chain.push(level);

            match next {
                Some(parent) => current = parent,
                None => break,
            }
        }

        let depth = chain.len();
        let mut view = base;
        while let Some(mut level) = chain.pop() {
            if let Some(parent) = view.as_ref() {
                level.merge_parent(parent);
            }
            self.cache.store(&level).await;
            view = Some(level);
        }

        debug!(id, loaded = depth, "level resolved");
        // The loop always either pushes a level or sets `base` before breaking.
        view.ok_or_else(|| ResolveError::NotFound { id: id.to_string() })
    }
}
