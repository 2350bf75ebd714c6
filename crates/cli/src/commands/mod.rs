pub mod admin;
pub mod migrate;
pub mod seed;

use secrecy::ExposeSecret;
use sqlx::PgPool;

use teainn_server::config::{ConfigError, database_url_from_env};

/// Errors shared by every command that talks to the database.
#[derive(Debug, thiserror::Error)]
pub enum ConnectError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Connect using `TEAINN_DATABASE_URL` or `DATABASE_URL`.
pub async fn connect() -> Result<PgPool, ConnectError> {
    let database_url = database_url_from_env()?;

    tracing::info!("Connecting to database...");
    Ok(PgPool::connect(database_url.expose_secret()).await?)
}
