use async_trait::async_trait;
use sqlx::types::Json;

use crate::application::repos::{LevelStore, RepoError};
use crate::domain::{Level, LevelFields};

use super::PostgresLevelStore;
use super::util::map_sqlx_error;

#[derive(sqlx::FromRow)]
struct LevelRow {
    id: String,
    parent_id: Option<String>,
    body: Json<serde_json::Value>,
}

impl TryFrom<LevelRow> for Level {
    type Error = RepoError;

    fn try_from(row: LevelRow) -> Result<Self, Self::Error> {
        let fields: LevelFields = serde_json::from_value(row.body.0)
            .map_err(|err| RepoError::malformed(row.id.clone(), err))?;
        Ok(Self {
            id: row.id,
            parent: row.parent_id.filter(|parent| !parent.is_empty()),
            fields,
        })
    }
}

#[async_trait]
impl LevelStore for PostgresLevelStore {
    async fn get(&self, id: &str) -> Result<Option<Level>, RepoError> {
        let row = sqlx::query_as::<_, LevelRow>(
            r#"
            SELECT id, parent_id, body
            FROM levels
            WHERE root = $1 AND id = $2
            "#,
        )
        .bind(self.root())
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        row.map(Level::try_from).transpose()
    }

    async fn put(&self, level: &Level) -> Result<(), RepoError> {
        sqlx::query(
            r#"
            INSERT INTO levels (root, id, parent_id, body)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (root, id) DO UPDATE
            SET parent_id = EXCLUDED.parent_id,
                body = EXCLUDED.body,
                updated_at = now()
            "#,
        )
        .bind(self.root())
        .bind(&level.id)
        .bind(level.parent.as_deref())
        .bind(Json(&level.fields))
        .execute(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), RepoError> {
        sqlx::query(
            r#"
            DELETE FROM levels
            WHERE root = $1 AND id = $2
            "#,
        )
        .bind(self.root())
        .bind(id)
        .execute(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn query_children(&self, parent_id: &str) -> Result<Vec<String>, RepoError> {
        sqlx::query_scalar::<_, String>(
            r#"
            SELECT id
            FROM levels
            WHERE root = $1 AND parent_id = $2
            ORDER BY id
            "#,
        )
        .bind(self.root())
        .bind(parent_id)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)
    }

    async fn query_all(&self, limit: u32) -> Result<Vec<String>, RepoError> {
        sqlx::query_scalar::<_, String>(
            r#"
            SELECT id
            FROM levels
            WHERE root = $1
            ORDER BY id
            LIMIT $2
            "#,
        )
        .bind(self.root())
        .bind(i64::from(limit))
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)
    }
}
