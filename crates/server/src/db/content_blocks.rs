//! Content block repository.

use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;
use sqlx::PgPool;

use teainn_core::ContentBlockId;

use super::RepositoryError;
use crate::models::ContentBlock;

#[derive(Debug, sqlx::FromRow)]
struct ContentBlockRow {
    id: i32,
    key: String,
    payload: JsonValue,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ContentBlockRow> for ContentBlock {
    fn from(row: ContentBlockRow) -> Self {
        Self {
            id: ContentBlockId::new(row.id),
            key: row.key,
            payload: row.payload,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const COLUMNS: &str = "id, key, payload, created_at, updated_at";

pub struct ContentBlockRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ContentBlockRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<ContentBlock>, RepositoryError> {
        let rows = sqlx::query_as::<_, ContentBlockRow>(&format!(
            "SELECT {COLUMNS} FROM content_blocks ORDER BY key ASC"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, key: &str) -> Result<Option<ContentBlock>, RepositoryError> {
        let row = sqlx::query_as::<_, ContentBlockRow>(&format!(
            "SELECT {COLUMNS} FROM content_blocks WHERE key = $1"
        ))
        .bind(key)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// Create the block or replace its payload.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the upsert fails.
    pub async fn upsert(
        &self,
        key: &str,
        payload: &JsonValue,
    ) -> Result<ContentBlock, RepositoryError> {
        let row = sqlx::query_as::<_, ContentBlockRow>(&format!(
            r"
            INSERT INTO content_blocks (key, payload)
            VALUES ($1, $2)
            ON CONFLICT (key) DO UPDATE SET payload = EXCLUDED.payload, updated_at = NOW()
            RETURNING {COLUMNS}
            "
        ))
        .bind(key)
        .bind(payload)
        .fetch_one(self.pool)
        .await?;

        Ok(row.into())
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no block has that key.
    pub async fn delete(&self, key: &str) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM content_blocks WHERE key = $1")
            .bind(key)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
