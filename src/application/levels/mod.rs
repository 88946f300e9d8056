//! Level services: ancestor resolution, invalidation and listing.

mod batch;
mod invalidation;
mod listing;
mod resolver;
mod service;

use thiserror::Error;

use crate::application::repos::RepoError;

pub use batch::{BatchParseError, BatchRequest, BatchSummary};
pub use invalidation::{InvalidationCoordinator, InvalidationReport};
pub use listing::{DEFAULT_PAGE_LIMIT, LevelCollection};
pub use resolver::LevelResolver;
pub use service::{LevelService, ServedResponse};

#[derive(Debug, Error)]
pub enum ResolveError {
    /// The level, or an ancestor it inherits from, does not exist.
    #[error("level `{id}` does not exist")]
    NotFound { id: String },
    #[error("parent chain revisits level `{id}`")]
    CycleDetected { id: String },
    #[error("level store failure: {0}")]
    Store(#[from] RepoError),
}
