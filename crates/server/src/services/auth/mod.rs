//! Admin authentication service.
//!
//! Passwords are hashed with Argon2id. Hashes written by the previous CMS
//! (bcrypt, `$2a$`/`$2b$`/`$2y$` prefixes) still verify.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use secrecy::ExposeSecret;
use sqlx::PgPool;

use crate::config::BootstrapAdmin;
use crate::db::{AdminRepository, RepositoryError};
use crate::models::Admin;

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Authentication service.
///
/// Handles admin login, including first-login provisioning of the
/// environment-configured bootstrap account.
pub struct AuthService<'a> {
    admins: AdminRepository<'a>,
    bootstrap: Option<&'a BootstrapAdmin>,
}

impl<'a> AuthService<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool, bootstrap: Option<&'a BootstrapAdmin>) -> Self {
        Self {
            admins: AdminRepository::new(pool),
            bootstrap,
        }
    }

    /// Login with username and password.
    ///
    /// When no admin row exists for `username` and the credentials equal the
    /// bootstrap pair, the admin is created on the spot.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the username/password is wrong.
    pub async fn login(&self, username: &str, password: &str) -> Result<Admin, AuthError> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(AuthError::InvalidCredentials);
        }

        if let Some((admin, password_hash)) = self.admins.get_with_hash(username).await? {
            verify_password(password, &password_hash)?;
            return Ok(admin);
        }

        match self.bootstrap {
            Some(bootstrap) if bootstrap.matches(username, password) => {
                self.provision_bootstrap(bootstrap).await
            }
            _ => Err(AuthError::InvalidCredentials),
        }
    }

    async fn provision_bootstrap(&self, bootstrap: &BootstrapAdmin) -> Result<Admin, AuthError> {
        let password = bootstrap.password.expose_secret();
        let password_hash = hash_password(password)?;

        match self
            .admins
            .create(
                &bootstrap.username,
                &password_hash,
                Some(&bootstrap.display_name),
            )
            .await
        {
            Ok(admin) => {
                tracing::info!(admin_id = %admin.id, username = %admin.username, "Bootstrap admin created");
                Ok(admin)
            }
            // A concurrent login created the row first.
            Err(RepositoryError::Conflict(_)) => {
                let (admin, stored_hash) = self
                    .admins
                    .get_with_hash(&bootstrap.username)
                    .await?
                    .ok_or(AuthError::InvalidCredentials)?;
                verify_password(password, &stored_hash)?;
                Ok(admin)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Create an admin account.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidUsername` for a blank username.
    /// Returns `AuthError::WeakPassword` if the password doesn't meet requirements.
    /// Returns `AuthError::AdminAlreadyExists` if the username is taken.
    pub async fn create_admin(
        &self,
        username: &str,
        password: &str,
        name: Option<&str>,
    ) -> Result<Admin, AuthError> {
        let username = validate_username(username)?;
        validate_password(password)?;
        let password_hash = hash_password(password)?;

        self.admins
            .create(username, &password_hash, name)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::AdminAlreadyExists,
                other => AuthError::Repository(other),
            })
    }

    /// Replace an admin's password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::WeakPassword` if the password doesn't meet requirements.
    /// Returns `AuthError::AdminNotFound` if no admin has that username.
    pub async fn set_password(&self, username: &str, password: &str) -> Result<(), AuthError> {
        validate_password(password)?;
        let password_hash = hash_password(password)?;

        self.admins
            .set_password_hash(username.trim(), &password_hash)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => AuthError::AdminNotFound,
                other => AuthError::Repository(other),
            })
    }
}

fn validate_username(username: &str) -> Result<&str, AuthError> {
    let username = username.trim();
    if username.is_empty() || username.chars().any(char::is_whitespace) {
        return Err(AuthError::InvalidUsername);
    }
    Ok(username)
}

fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    Ok(())
}

/// Hash a password using Argon2id.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against an Argon2 or legacy bcrypt hash.
///
/// # Errors
///
/// Returns `AuthError::InvalidCredentials` on mismatch or an unreadable hash.
pub fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    if hash.starts_with("$2") {
        return match bcrypt::verify(password, hash) {
            Ok(true) => Ok(()),
            Ok(false) | Err(_) => Err(AuthError::InvalidCredentials),
        };
    }

    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}
