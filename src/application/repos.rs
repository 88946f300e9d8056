//! Repository traits describing persistence adapters.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::Level;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("database timeout")]
    Timeout,
    #[error("stored level `{id}` is malformed: {message}")]
    Malformed { id: String, message: String },
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }

    pub fn malformed(id: impl Into<String>, err: impl std::fmt::Display) -> Self {
        Self::Malformed {
            id: id.into(),
            message: err.to_string(),
        }
    }
}

/// Authoritative level storage, scoped to a single collection root.
///
/// `put` is a full replacement. Deleting a missing id succeeds. Child and
/// listing queries observe every write that completed before them.
#[async_trait]
pub trait LevelStore: Send + Sync {
    async fn get(&self, id: &str) -> Result<Option<Level>, RepoError>;

    async fn put(&self, level: &Level) -> Result<(), RepoError>;

    async fn delete(&self, id: &str) -> Result<(), RepoError>;

    /// Ids of levels whose parent is `parent_id`.
    async fn query_children(&self, parent_id: &str) -> Result<Vec<String>, RepoError>;

    /// Up to `limit` ids in the store's stable order.
    async fn query_all(&self, limit: u32) -> Result<Vec<String>, RepoError>;
}
