//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                          - Liveness check
//! GET  /health/ready                    - Readiness check (database)
//!
//! # Public API
//! GET  /api/categories                  - Active categories
//! GET  /api/products                    - Active products (?category=<slug>&featured=true)
//! GET  /api/stores                      - Active stores
//! GET  /api/events                      - Active events
//! GET  /api/events/{slug}               - One active event
//! GET  /api/promotions                  - Active promotions
//! GET  /api/franchise-plans             - Active franchise plans
//! GET  /api/settings                    - Site settings map
//! GET  /api/content/{key}               - Content block payload
//! POST /api/contact                     - Contact form (rate limited)
//!
//! # Admin API (session required)
//! POST /api/admin/login                 - Log in (rate limited)
//! POST /api/admin/logout                - Log out
//! GET  /api/admin/me                    - Current admin
//! GET  /api/admin/dashboard             - Counts
//! *    /api/admin/categories[/{id}]     - Categories CRUD
//! *    /api/admin/products[/{id}]       - Products CRUD
//! *    /api/admin/stores[/{id}]         - Stores CRUD
//! *    /api/admin/events[/{id}]         - Events CRUD
//! *    /api/admin/promotions[/{id}]     - Promotions CRUD
//! *    /api/admin/franchise-plans[/{id}] - Franchise plans CRUD
//! *    /api/admin/content-blocks[/{key}] - Content blocks
//! GET/POST /api/admin/settings          - Settings map / batch upsert
//! *    /api/admin/contact-messages[/{id}] - Inbox
//! POST /api/admin/upload                - Image upload
//! ```

pub mod admin;
pub mod contact;
pub mod public;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};

use crate::state::AppState;

/// Public read routes, relative to `/api`.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/categories", get(public::categories))
        .route("/products", get(public::products))
        .route("/stores", get(public::stores))
        .route("/events", get(public::events))
        .route("/events/{slug}", get(public::event))
        .route("/promotions", get(public::promotions))
        .route("/franchise-plans", get(public::franchise_plans))
        .route("/settings", get(public::settings))
        .route("/content/{key}", get(public::content))
}

/// Contact submission, rate limited per client IP.
pub fn contact_routes() -> Router<AppState> {
    Router::new()
        .route("/contact", post(contact::submit))
        .route_layer(crate::middleware::contact_rate_limiter())
}

/// Create all routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .nest(
            "/api",
            public_routes()
                .merge(contact_routes())
                .nest("/admin", admin::router()),
        )
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the database is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match sqlx::query("SELECT 1").fetch_one(state.pool()).await {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::warn!("Readiness check failed: {e}");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
