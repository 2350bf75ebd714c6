//! Database operations for the site `PostgreSQL`.
//!
//! ## Tables
//!
//! - `admins` - CMS administrators (argon2 or legacy bcrypt hashes)
//! - `admin_session` - Admin session storage (tower-sessions)
//! - `categories`, `products`, `product_sizes`, `product_toppings` - Menu catalog
//! - `stores`, `events`, `promotions`, `franchise_plans` - Marketing records
//! - `content_blocks` - Keyed JSONB documents for page sections
//! - `site_settings` - Flat key/value settings
//! - `contact_messages` - Contact form submissions
//!
//! Display order lives in `sort_order` columns and is exposed as `order`.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p teainn-cli -- migrate
//! ```

pub mod admins;
pub mod categories;
pub mod contact_messages;
pub mod content_blocks;
pub mod dashboard;
pub mod events;
pub mod franchise_plans;
pub mod products;
pub mod promotions;
pub mod settings;
pub mod stores;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use teainn_core::{Slug, SlugError};

pub use admins::AdminRepository;
pub use categories::CategoryRepository;
pub use contact_messages::ContactMessageRepository;
pub use content_blocks::ContentBlockRepository;
pub use dashboard::{DashboardRepository, DashboardStats};
pub use events::EventRepository;
pub use franchise_plans::FranchisePlanRepository;
pub use products::ProductRepository;
pub use promotions::PromotionRepository;
pub use settings::SettingsRepository;
pub use stores::StoreRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Unique constraint violation (e.g., duplicate slug).
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// Foreign key points at a row that does not exist.
    #[error("invalid reference: {0}")]
    InvalidReference(String),
}

impl RepositoryError {
    /// Map a write error, turning constraint violations into their own
    /// variants.
    pub(crate) fn from_write(e: sqlx::Error, conflict: &str, reference: &str) -> Self {
        if let sqlx::Error::Database(ref db_err) = e {
            if db_err.is_unique_violation() {
                return Self::Conflict(conflict.to_owned());
            }
            if db_err.is_foreign_key_violation() {
                return Self::InvalidReference(reference.to_owned());
            }
        }
        Self::Database(e)
    }

    /// Unique-slug violations on create or update.
    pub(crate) fn slug_write(e: sqlx::Error) -> Self {
        Self::from_write(e, "slug 已被使用", "關聯資料不存在")
    }
}

/// Parse a slug read back from the database.
pub(crate) fn stored_slug(raw: String) -> Result<Slug, RepositoryError> {
    Slug::try_from(raw).map_err(|e: SlugError| {
        RepositoryError::DataCorruption(format!("invalid slug in database: {e}"))
    })
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
