//! Counts for the admin dashboard.

use serde::Serialize;
use sqlx::PgPool;

use super::RepositoryError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub products: i64,
    pub stores: i64,
    pub active_events: i64,
    pub messages: i64,
    pub unread_messages: i64,
    pub categories: i64,
}

pub struct DashboardRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> DashboardRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn stats(&self) -> Result<DashboardStats, RepositoryError> {
        let stats = sqlx::query_as::<_, DashboardStats>(
            r"
            SELECT
                (SELECT COUNT(*) FROM products) AS products,
                (SELECT COUNT(*) FROM stores) AS stores,
                (SELECT COUNT(*) FROM events WHERE is_active) AS active_events,
                (SELECT COUNT(*) FROM contact_messages) AS messages,
                (SELECT COUNT(*) FROM contact_messages WHERE NOT is_read) AS unread_messages,
                (SELECT COUNT(*) FROM categories) AS categories
            ",
        )
        .fetch_one(self.pool)
        .await?;

        Ok(stats)
    }
}
