//! Postgres-backed level store.

mod levels;
mod util;

pub use util::map_sqlx_error;

use std::sync::Arc;

use sqlx::postgres::{PgPool, PgPoolOptions};

/// Levels of one collection root, stored in the `levels` table.
#[derive(Clone)]
pub struct PostgresLevelStore {
    pool: Arc<PgPool>,
    root: String,
}

impl PostgresLevelStore {
    pub fn new(pool: PgPool, root: impl Into<String>) -> Self {
        Self {
            pool: Arc::new(pool),
            root: root.into(),
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Collection root every query is scoped to.
    pub fn root(&self) -> &str {
        &self.root
    }

    pub async fn connect(url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
        PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await
    }

    pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::Error> {
        sqlx::migrate!("./migrations")
            .run(pool)
            .await
            .map_err(Into::into)
    }
}
