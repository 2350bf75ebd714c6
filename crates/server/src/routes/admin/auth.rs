//! Admin login, logout and profile.

use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, JsonBody, Result, clear_sentry_user, set_sentry_user};
use crate::middleware::{
    RequireAdminAuth, clear_current_admin, login_rate_limiter, set_current_admin,
};
use crate::models::CurrentAdmin;
use crate::services::AuthService;
use crate::state::AppState;

/// Build the auth router. Login is rate limited per client IP.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route_layer(login_rate_limiter())
        .route("/logout", post(logout))
        .route("/me", get(me))
}

/// Login body. No `Debug` so the password never reaches logs.
#[derive(Default, Deserialize)]
pub struct LoginInput {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    pub success: bool,
}

/// Log in with username and password.
///
/// POST /api/admin/login
#[instrument(skip(state, session, input))]
async fn login(
    State(state): State<AppState>,
    session: Session,
    JsonBody(input): JsonBody<LoginInput>,
) -> Result<Json<CurrentAdmin>> {
    let (Some(username), Some(password)) = (input.username, input.password) else {
        return Err(AppError::BadRequest("請輸入帳號和密碼".to_owned()));
    };

    let auth = AuthService::new(state.pool(), state.config().bootstrap_admin.as_ref());
    let admin = match auth.login(&username, &password).await {
        Ok(admin) => admin,
        Err(e) => {
            tracing::warn!(username = %username.trim(), "Admin login failed: {e}");
            return Err(e.into());
        }
    };

    let current = CurrentAdmin::from(&admin);
    set_current_admin(&session, &current)
        .await
        .map_err(|e| AppError::Internal(format!("session error: {e}")))?;
    set_sentry_user(&current.id, Some(&current.username));

    tracing::info!(admin_id = %current.id, "Admin logged in");
    Ok(Json(current))
}

/// Log out and clear the session.
///
/// POST /api/admin/logout
async fn logout(session: Session) -> Json<LogoutResponse> {
    if let Err(e) = clear_current_admin(&session).await {
        tracing::warn!("Failed to clear admin session: {e}");
    }
    clear_sentry_user();
    Json(LogoutResponse { success: true })
}

/// GET /api/admin/me
async fn me(RequireAdminAuth(admin): RequireAdminAuth) -> Json<CurrentAdmin> {
    Json(admin)
}
