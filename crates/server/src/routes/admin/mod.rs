//! Admin API handlers.
//!
//! Every handler except login/logout extracts [`RequireAdminAuth`] first, so
//! anonymous requests get 401 before any data access.
//!
//! [`RequireAdminAuth`]: crate::middleware::RequireAdminAuth

pub mod auth;
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
pub mod upload;

use axum::Router;
use serde::Serialize;

use crate::state::AppState;

/// Body returned by delete endpoints.
#[derive(Debug, Serialize)]
pub struct Deleted {
    pub message: &'static str,
}

impl Default for Deleted {
    fn default() -> Self {
        Self {
            message: "刪除成功",
        }
    }
}

/// All admin routes, relative to `/api/admin`.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(auth::router())
        .merge(dashboard::router())
        .merge(categories::router())
        .merge(products::router())
        .merge(stores::router())
        .merge(events::router())
        .merge(promotions::router())
        .merge(franchise_plans::router())
        .merge(content_blocks::router())
        .merge(settings::router())
        .merge(contact_messages::router())
        .merge(upload::router())
}
