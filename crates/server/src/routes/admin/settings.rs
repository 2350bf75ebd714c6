//! Admin site settings.

use std::collections::BTreeMap;

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;
use serde_json::Value;
use tracing::instrument;

use crate::db::{SettingsRepository, settings::stringify_settings};
use crate::error::{AppError, JsonBody, Result};
use crate::middleware::RequireAdminAuth;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct SettingsSaved {
    pub message: &'static str,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/settings", get(index).post(save))
}

/// GET /api/admin/settings
#[instrument(skip(state))]
async fn index(
    State(state): State<AppState>,
    RequireAdminAuth(admin): RequireAdminAuth,
) -> Result<Json<BTreeMap<String, String>>> {
    Ok(Json(SettingsRepository::new(state.pool()).get_all().await?))
}

/// POST /api/admin/settings
///
/// Upserts every key in the posted object; keys not mentioned are untouched.
#[instrument(skip(state, body))]
async fn save(
    State(state): State<AppState>,
    RequireAdminAuth(admin): RequireAdminAuth,
    JsonBody(body): JsonBody<Value>,
) -> Result<Json<SettingsSaved>> {
    let Value::Object(map) = body else {
        return Err(AppError::BadRequest("設定必須是物件".to_owned()));
    };
    let settings = stringify_settings(map);

    SettingsRepository::new(state.pool())
        .upsert_many(&settings)
        .await?;

    tracing::info!(keys = settings.len(), "Site settings updated");
    Ok(Json(SettingsSaved {
        message: "設定已更新",
    }))
}
