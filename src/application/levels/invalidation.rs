//! Invalidation cascade for level mutations.
//!
//! A change to a level invalidates every cached view derived from it: the
//! level's own merged view and response, those of every transitive
//! descendant, and the shared listing response.

use std::collections::{HashSet, VecDeque};
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use metrics::histogram;
use tracing::{info, instrument, warn};

use crate::application::repos::LevelStore;
use crate::cache::{CacheKey, ItemCache};

const METRIC_INVALIDATE_MS: &str = "levelkeep_invalidate_ms";

/// Outcome of one cascade.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvalidationReport {
    /// Levels whose entries were evicted, in visit order.
    pub evicted: Vec<String>,
    /// Levels whose children could not be enumerated. Their descendants may
    /// still hold stale entries.
    pub unexpanded: Vec<String>,
}

impl InvalidationReport {
    /// True when every descendant was reached.
    pub fn is_complete(&self) -> bool {
        self.unexpanded.is_empty()
    }
}

impl fmt::Display for InvalidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "InvalidationReport {{ evicted: {}, unexpanded: {} }}",
            self.evicted.len(),
            self.unexpanded.len(),
        )
    }
}

/// Evicts cached views after a write or delete.
///
/// The cascade is best effort. A failed child enumeration is logged and the
/// rest of the traversal continues; the triggering mutation still succeeds.
#[derive(Clone)]
pub struct InvalidationCoordinator {
    store: Arc<dyn LevelStore>,
    cache: ItemCache,
}

impl InvalidationCoordinator {
    pub fn new(store: Arc<dyn LevelStore>, cache: ItemCache) -> Self {
        Self { store, cache }
    }

    /// Evict `id`, all of its descendants, and the listing response.
    #[instrument(skip(self))]
    pub async fn invalidate(&self, id: &str) -> InvalidationReport {
        let started_at = Instant::now();
        let mut report = InvalidationReport::default();
        let mut visited: HashSet<String> = HashSet::new();
        let mut pending: VecDeque<String> = VecDeque::from([id.to_string()]);

        while let Some(current) = pending.pop_front() {
            if !visited.insert(current.clone()) {
                continue;
            }

            self.cache.evict(&CacheKey::level(&current)).await;
            self.cache.evict(&CacheKey::level_response(&current)).await;

            match self.store.query_children(&current).await {
                Ok(children) => pending.extend(
                    children
                        .into_iter()
                        .filter(|child| !visited.contains(child)),
                ),
                Err(err) => {
                    warn!(
                        id = %current,
                        error = %err,
                        "child query failed; descendants may keep stale entries"
                    );
                    report.unexpanded.push(current.clone());
                }
            }

            report.evicted.push(current);
        }

        self.cache.evict(&CacheKey::listing_response()).await;

        info!(
            root = id,
            report = %report,
            complete = report.is_complete(),
            "Level invalidation complete"
        );
        histogram!(
            METRIC_INVALIDATE_MS,
            "complete" => if report.is_complete() { "true" } else { "false" }
        )
        .record(started_at.elapsed().as_secs_f64() * 1000.0);

        report
    }
}
