//! Business logic services.
//!
//! - `auth` - Admin password authentication and bootstrap provisioning
//! - `storage` - Image uploads to the S3-compatible bucket

pub mod auth;
pub mod storage;

pub use auth::{AuthError, AuthService};
pub use storage::{ImageStorage, StorageError};
