//! Store location repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use teainn_core::StoreId;

use super::{RepositoryError, stored_slug};
use crate::models::input::split_patch;
use crate::models::{NewStore, Store, StoreChanges};

#[derive(Debug, sqlx::FromRow)]
struct StoreRow {
    id: i32,
    name: String,
    slug: String,
    address: String,
    phone: Option<String>,
    opening_hours: String,
    image: Option<String>,
    features: Vec<String>,
    map_url: Option<String>,
    order_url: Option<String>,
    is_active: bool,
    sort_order: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<StoreRow> for Store {
    type Error = RepositoryError;

    fn try_from(row: StoreRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: StoreId::new(row.id),
            name: row.name,
            slug: stored_slug(row.slug)?,
            address: row.address,
            phone: row.phone,
            opening_hours: row.opening_hours,
            image: row.image,
            features: row.features,
            map_url: row.map_url,
            order_url: row.order_url,
            is_active: row.is_active,
            order: row.sort_order,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const COLUMNS: &str = "id, name, slug, address, phone, opening_hours, image, features, \
                       map_url, order_url, is_active, sort_order, created_at, updated_at";

pub struct StoreRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> StoreRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List stores by display order, optionally only the active ones.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, active_only: bool) -> Result<Vec<Store>, RepositoryError> {
        let rows = sqlx::query_as::<_, StoreRow>(&format!(
            "SELECT {COLUMNS} FROM stores WHERE (NOT $1 OR is_active) \
             ORDER BY sort_order ASC, id ASC"
        ))
        .bind(active_only)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: StoreId) -> Result<Option<Store>, RepositoryError> {
        let row = sqlx::query_as::<_, StoreRow>(&format!(
            "SELECT {COLUMNS} FROM stores WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the slug is taken.
    pub async fn create(&self, new: &NewStore) -> Result<Store, RepositoryError> {
        let row = sqlx::query_as::<_, StoreRow>(&format!(
            r"
            INSERT INTO stores (
                name, slug, address, phone, opening_hours, image, features,
                map_url, order_url, is_active, sort_order
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {COLUMNS}
            "
        ))
        .bind(&new.name)
        .bind(new.slug.as_str())
        .bind(&new.address)
        .bind(&new.phone)
        .bind(&new.opening_hours)
        .bind(&new.image)
        .bind(&new.features)
        .bind(&new.map_url)
        .bind(&new.order_url)
        .bind(new.is_active)
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
    /// Returns `RepositoryError::NotFound` if the store does not exist.
    /// Returns `RepositoryError::Conflict` if the new slug is taken.
    pub async fn update(
        &self,
        id: StoreId,
        changes: StoreChanges,
    ) -> Result<Store, RepositoryError> {
        let (set_phone, phone) = split_patch(changes.phone);
        let (set_image, image) = split_patch(changes.image);
        let (set_map_url, map_url) = split_patch(changes.map_url);
        let (set_order_url, order_url) = split_patch(changes.order_url);

        let row = sqlx::query_as::<_, StoreRow>(&format!(
            r"
            UPDATE stores SET
                name = COALESCE($2, name),
                slug = COALESCE($3, slug),
                address = COALESCE($4, address),
                phone = CASE WHEN $5 THEN $6 ELSE phone END,
                opening_hours = COALESCE($7, opening_hours),
                image = CASE WHEN $8 THEN $9 ELSE image END,
                features = COALESCE($10, features),
                map_url = CASE WHEN $11 THEN $12 ELSE map_url END,
                order_url = CASE WHEN $13 THEN $14 ELSE order_url END,
                is_active = COALESCE($15, is_active),
                sort_order = COALESCE($16, sort_order),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {COLUMNS}
            "
        ))
        .bind(id)
        .bind(changes.name)
        .bind(changes.slug.map(String::from))
        .bind(changes.address)
        .bind(set_phone)
        .bind(phone)
        .bind(changes.opening_hours)
        .bind(set_image)
        .bind(image)
        .bind(changes.features)
        .bind(set_map_url)
        .bind(map_url)
        .bind(set_order_url)
        .bind(order_url)
        .bind(changes.is_active)
        .bind(changes.order)
        .fetch_optional(self.pool)
        .await
        .map_err(RepositoryError::slug_write)?
        .ok_or(RepositoryError::NotFound)?;

        row.try_into()
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the store does not exist.
    pub async fn delete(&self, id: StoreId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM stores WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
