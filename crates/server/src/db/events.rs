//! Event repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use teainn_core::EventId;

use super::{RepositoryError, stored_slug};
use crate::models::input::split_patch;
use crate::models::{Event, EventChanges, NewEvent};

#[derive(Debug, sqlx::FromRow)]
struct EventRow {
    id: i32,
    title: String,
    slug: String,
    subtitle: Option<String>,
    description: Option<String>,
    image: Option<String>,
    category: Option<String>,
    start_date: Option<DateTime<Utc>>,
    end_date: Option<DateTime<Utc>>,
    is_active: bool,
    is_featured: bool,
    sort_order: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<EventRow> for Event {
    type Error = RepositoryError;

    fn try_from(row: EventRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: EventId::new(row.id),
            title: row.title,
            slug: stored_slug(row.slug)?,
            subtitle: row.subtitle,
            description: row.description,
            image: row.image,
            category: row.category,
            start_date: row.start_date,
            end_date: row.end_date,
            is_active: row.is_active,
            is_featured: row.is_featured,
            order: row.sort_order,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const COLUMNS: &str = "id, title, slug, subtitle, description, image, category, start_date, \
                       end_date, is_active, is_featured, sort_order, created_at, updated_at";

pub struct EventRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> EventRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List events by display order, newest first within the same order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, active_only: bool) -> Result<Vec<Event>, RepositoryError> {
        let rows = sqlx::query_as::<_, EventRow>(&format!(
            "SELECT {COLUMNS} FROM events WHERE (NOT $1 OR is_active) \
             ORDER BY sort_order ASC, created_at DESC"
        ))
        .bind(active_only)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: EventId) -> Result<Option<Event>, RepositoryError> {
        let row = sqlx::query_as::<_, EventRow>(&format!(
            "SELECT {COLUMNS} FROM events WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Look up an event by slug regardless of its active flag.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_slug(&self, slug: &str) -> Result<Option<Event>, RepositoryError> {
        let row = sqlx::query_as::<_, EventRow>(&format!(
            "SELECT {COLUMNS} FROM events WHERE slug = $1"
        ))
        .bind(slug)
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the slug is taken.
    pub async fn create(&self, new: &NewEvent) -> Result<Event, RepositoryError> {
        let row = sqlx::query_as::<_, EventRow>(&format!(
            r"
            INSERT INTO events (
                title, slug, subtitle, description, image, category,
                start_date, end_date, is_active, is_featured, sort_order
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {COLUMNS}
            "
        ))
        .bind(&new.title)
        .bind(new.slug.as_str())
        .bind(&new.subtitle)
        .bind(&new.description)
        .bind(&new.image)
        .bind(&new.category)
        .bind(new.start_date)
        .bind(new.end_date)
        .bind(new.is_active)
        .bind(new.is_featured)
        .bind(new.order)
        .fetch_one(self.pool)
        .await
        .map_err(RepositoryError::slug_write)?;

        row.try_into()
    }

    /// Apply a partial update.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the event does not exist.
    /// Returns `RepositoryError::Conflict` if the new slug is taken.
    pub async fn update(
        &self,
        id: EventId,
        changes: EventChanges,
    ) -> Result<Event, RepositoryError> {
        let (set_subtitle, subtitle) = split_patch(changes.subtitle);
        let (set_description, description) = split_patch(changes.description);
        let (set_image, image) = split_patch(changes.image);
        let (set_category, category) = split_patch(changes.category);
        let (set_start, start_date) = split_patch(changes.start_date);
        let (set_end, end_date) = split_patch(changes.end_date);

        let row = sqlx::query_as::<_, EventRow>(&format!(
            r"
            UPDATE events SET
                title = COALESCE($2, title),
                slug = COALESCE($3, slug),
                subtitle = CASE WHEN $4 THEN $5 ELSE subtitle END,
                description = CASE WHEN $6 THEN $7 ELSE description END,
                image = CASE WHEN $8 THEN $9 ELSE image END,
                category = CASE WHEN $10 THEN $11 ELSE category END,
                start_date = CASE WHEN $12 THEN $13 ELSE start_date END,
                end_date = CASE WHEN $14 THEN $15 ELSE end_date END,
                is_active = COALESCE($16, is_active),
                is_featured = COALESCE($17, is_featured),
                sort_order = COALESCE($18, sort_order),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {COLUMNS}
            "
        ))
        .bind(id)
        .bind(changes.title)
        .bind(changes.slug.map(String::from))
        .bind(set_subtitle)
        .bind(subtitle)
        .bind(set_description)
        .bind(description)
        .bind(set_image)
        .bind(image)
        .bind(set_category)
        .bind(category)
        .bind(set_start)
        .bind(start_date)
        .bind(set_end)
        .bind(end_date)
        .bind(changes.is_active)
        .bind(changes.is_featured)
        .bind(changes.order)
        .fetch_optional(self.pool)
        .await
        .map_err(RepositoryError::slug_write)?
        .ok_or(RepositoryError::NotFound)?;

        row.try_into()
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the event does not exist.
    pub async fn delete(&self, id: EventId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
