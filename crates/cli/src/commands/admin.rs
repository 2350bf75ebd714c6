//! Admin account management commands.
//!
//! # Usage
//!
//! ```bash
//! # Create an admin (password may also come from ADMIN_PASSWORD)
//! teainn-cli admin create -u manager -n "店長" --password '...'
//!
//! # Rotate a password
//! teainn-cli admin set-password manager --password '...'
//! ```
//!
//! # Environment Variables
//!
//! - `TEAINN_DATABASE_URL` (or `DATABASE_URL`) - `PostgreSQL` connection string

use thiserror::Error;

use teainn_server::services::{AuthError, AuthService};

use super::ConnectError;

/// Errors that can occur during admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    #[error(transparent)]
    Connect(#[from] ConnectError),

    #[error("Admin user already exists: {0}")]
    UserExists(String),

    #[error("No admin named {0}")]
    UserNotFound(String),

    #[error("Invalid username: {0:?}")]
    InvalidUsername(String),

    #[error("{0}")]
    WeakPassword(String),

    #[error("Auth error: {0}")]
    Auth(AuthError),
}

impl AdminError {
    fn from_auth(e: AuthError, username: &str) -> Self {
        match e {
            AuthError::AdminAlreadyExists => Self::UserExists(username.to_owned()),
            AuthError::AdminNotFound => Self::UserNotFound(username.to_owned()),
            AuthError::InvalidUsername => Self::InvalidUsername(username.to_owned()),
            AuthError::WeakPassword(msg) => Self::WeakPassword(msg),
            other => Self::Auth(other),
        }
    }
}

/// Create a new admin account.
///
/// # Arguments
///
/// * `username` - Login name, no whitespace
/// * `name` - Display name shown in the CMS
/// * `password` - Initial password
///
/// # Errors
///
/// Returns `AdminError` if the username is taken or invalid, the password is
/// too short, or the database is unreachable.
pub async fn create(username: &str, name: Option<&str>, password: &str) -> Result<(), AdminError> {
    let pool = super::connect().await?;

    tracing::info!("Creating admin user: {}", username);
    let admin = AuthService::new(&pool, None)
        .create_admin(username, password, name)
        .await
        .map_err(|e| AdminError::from_auth(e, username))?;

    tracing::info!(
        "Admin user created successfully! ID: {}, Username: {}, Name: {}",
        admin.id,
        admin.username,
        admin.display_name()
    );
    Ok(())
}

/// Replace the password of an existing admin.
///
/// # Errors
///
/// Returns `AdminError` if no admin has that username, the password is too
/// short, or the database is unreachable.
pub async fn set_password(username: &str, password: &str) -> Result<(), AdminError> {
    let pool = super::connect().await?;

    AuthService::new(&pool, None)
        .set_password(username, password)
        .await
        .map_err(|e| AdminError::from_auth(e, username))?;

    tracing::info!("Password updated for {}", username);
    Ok(())
}
