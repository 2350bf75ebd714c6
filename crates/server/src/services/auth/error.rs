//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Wrong password or unknown username.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Admin not found.
    #[error("admin not found")]
    AdminNotFound,

    /// Username already taken.
    #[error("admin already exists")]
    AdminAlreadyExists,

    /// Username is blank or otherwise unusable.
    #[error("invalid username")]
    InvalidUsername,

    /// Password too weak or invalid.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}
