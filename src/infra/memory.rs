//! In-memory level store.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::application::repos::{LevelStore, RepoError};
use crate::domain::Level;

/// Process-local store ordered by id. Backs `batch --ephemeral` sessions
/// and tests.
#[derive(Default)]
pub struct MemoryLevelStore {
    levels: RwLock<BTreeMap<String, Level>>,
}

impl MemoryLevelStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.levels.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.levels.read().await.is_empty()
    }
}

#[async_trait]
impl LevelStore for MemoryLevelStore {
    async fn get(&self, id: &str) -> Result<Option<Level>, RepoError> {
        Ok(self.levels.read().await.get(id).cloned())
    }

    async fn put(&self, level: &Level) -> Result<(), RepoError> {
        self.levels
            .write()
            .await
            .insert(level.id.clone(), level.clone());
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), RepoError> {
        self.levels.write().await.remove(id);
        Ok(())
    }

    async fn query_children(&self, parent_id: &str) -> Result<Vec<String>, RepoError> {
        Ok(self
            .levels
            .read()
            .await
            .values()
            .filter(|level| level.parent_id() == Some(parent_id))
            .map(|level| level.id.clone())
            .collect())
    }

    async fn query_all(&self, limit: u32) -> Result<Vec<String>, RepoError> {
        Ok(self
            .levels
            .read()
            .await
            .keys()
            .take(limit as usize)
            .cloned()
            .collect())
    }
}
