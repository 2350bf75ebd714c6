//! TeaInn Core - Shared types library.
//!
//! This crate provides common types used across all TeaInn components:
//! - `server` - Public site API and admin CMS API
//! - `cli` - Command-line tools for migrations, seeding and admin accounts
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no database access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, emails and slugs
//! - [`content`] - Payload shapes of the well-known content blocks

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod content;
pub mod types;

pub use types::*;
