//! Promotion repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use teainn_core::PromotionId;

use super::RepositoryError;
use crate::models::input::split_patch;
use crate::models::{NewPromotion, Promotion, PromotionChanges};

#[derive(Debug, sqlx::FromRow)]
struct PromotionRow {
    id: i32,
    title: String,
    description: Option<String>,
    icon: Option<String>,
    link: Option<String>,
    is_active: bool,
    sort_order: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<PromotionRow> for Promotion {
    fn from(row: PromotionRow) -> Self {
        Self {
            id: PromotionId::new(row.id),
            title: row.title,
            description: row.description,
            icon: row.icon,
            link: row.link,
            is_active: row.is_active,
            order: row.sort_order,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const COLUMNS: &str =
    "id, title, description, icon, link, is_active, sort_order, created_at, updated_at";

pub struct PromotionRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> PromotionRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, active_only: bool) -> Result<Vec<Promotion>, RepositoryError> {
        let rows = sqlx::query_as::<_, PromotionRow>(&format!(
            "SELECT {COLUMNS} FROM promotions WHERE (NOT $1 OR is_active) \
             ORDER BY sort_order ASC, id ASC"
        ))
        .bind(active_only)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: PromotionId) -> Result<Option<Promotion>, RepositoryError> {
        let row = sqlx::query_as::<_, PromotionRow>(&format!(
            "SELECT {COLUMNS} FROM promotions WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, new: &NewPromotion) -> Result<Promotion, RepositoryError> {
        let row = sqlx::query_as::<_, PromotionRow>(&format!(
            "INSERT INTO promotions (title, description, icon, link, is_active, sort_order) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {COLUMNS}"
        ))
        .bind(&new.title)
        .bind(&new.description)
        .bind(&new.icon)
        .bind(&new.link)
        .bind(new.is_active)
        .bind(new.order)
        .fetch_one(self.pool)
        .await?;

        Ok(row.into())
    }

    /// Apply a partial update.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the promotion does not exist.
    pub async fn update(
        &self,
        id: PromotionId,
        changes: PromotionChanges,
    ) -> Result<Promotion, RepositoryError> {
        let (set_description, description) = split_patch(changes.description);
        let (set_icon, icon) = split_patch(changes.icon);
        let (set_link, link) = split_patch(changes.link);

        let row = sqlx::query_as::<_, PromotionRow>(&format!(
            r"
            UPDATE promotions SET
                title = COALESCE($2, title),
                description = CASE WHEN $3 THEN $4 ELSE description END,
                icon = CASE WHEN $5 THEN $6 ELSE icon END,
                link = CASE WHEN $7 THEN $8 ELSE link END,
                is_active = COALESCE($9, is_active),
                sort_order = COALESCE($10, sort_order),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {COLUMNS}
            "
        ))
        .bind(id)
        .bind(changes.title)
        .bind(set_description)
        .bind(description)
        .bind(set_icon)
        .bind(icon)
        .bind(set_link)
        .bind(link)
        .bind(changes.is_active)
        .bind(changes.order)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        Ok(row.into())
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the promotion does not exist.
    pub async fn delete(&self, id: PromotionId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM promotions WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
