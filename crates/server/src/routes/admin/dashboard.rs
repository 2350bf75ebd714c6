//! Admin dashboard counts.

use axum::{Json, Router, extract::State, routing::get};
use tracing::instrument;

use crate::db::{DashboardRepository, DashboardStats};
use crate::error::Result;
use crate::middleware::RequireAdminAuth;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/dashboard", get(stats))
}

/// GET /api/admin/dashboard
#[instrument(skip(state, _admin))]
async fn stats(
    State(state): State<AppState>,
    _admin: RequireAdminAuth,
) -> Result<Json<DashboardStats>> {
    Ok(Json(DashboardRepository::new(state.pool()).stats().await?))
}
