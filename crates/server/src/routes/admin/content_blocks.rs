//! Admin content block editing.
//!
//! Blocks are addressed by key and always upserted, so saving a section for
//! the first time needs no separate create step.

use axum::{Json, Router, extract::State, routing::get};
use tracing::instrument;

use crate::db::ContentBlockRepository;
use crate::error::{AppError, JsonBody, PathParam, Result, not_found};
use crate::middleware::RequireAdminAuth;
use crate::models::{ContentBlock, ContentBlockUpsert, ContentPayload};
use crate::state::AppState;

use super::Deleted;

const NOT_FOUND: &str = "內容區塊不存在";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/content-blocks", get(index).post(upsert))
        .route(
            "/content-blocks/{key}",
            get(show).put(update).delete(destroy),
        )
}

/// GET /api/admin/content-blocks
#[instrument(skip(state))]
async fn index(
    State(state): State<AppState>,
    RequireAdminAuth(admin): RequireAdminAuth,
) -> Result<Json<Vec<ContentBlock>>> {
    Ok(Json(ContentBlockRepository::new(state.pool()).list().await?))
}

/// GET /api/admin/content-blocks/{key}
#[instrument(skip(state))]
async fn show(
    State(state): State<AppState>,
    RequireAdminAuth(admin): RequireAdminAuth,
    PathParam(key): PathParam<String>,
) -> Result<Json<ContentBlock>> {
    let block = ContentBlockRepository::new(state.pool())
        .get(&key)
        .await?
        .ok_or_else(|| AppError::NotFound(NOT_FOUND.to_owned()))?;
    Ok(Json(block))
}

/// POST /api/admin/content-blocks
#[instrument(skip(state, input))]
async fn upsert(
    State(state): State<AppState>,
    RequireAdminAuth(admin): RequireAdminAuth,
    JsonBody(input): JsonBody<ContentBlockUpsert>,
) -> Result<Json<ContentBlock>> {
    let (key, payload) = input.into_parts()?;
    let block = ContentBlockRepository::new(state.pool())
        .upsert(&key, &payload)
        .await?;

    tracing::info!(key = %block.key, "Content block saved");
    Ok(Json(block))
}

/// PUT /api/admin/content-blocks/{key}
#[instrument(skip(state, input))]
async fn update(
    State(state): State<AppState>,
    RequireAdminAuth(admin): RequireAdminAuth,
    PathParam(key): PathParam<String>,
    JsonBody(input): JsonBody<ContentPayload>,
) -> Result<Json<ContentBlock>> {
    let block = ContentBlockRepository::new(state.pool())
        .upsert(&key, &input.into_value())
        .await?;

    tracing::info!(key = %block.key, "Content block saved");
    Ok(Json(block))
}

/// DELETE /api/admin/content-blocks/{key}
#[instrument(skip(state))]
async fn destroy(
    State(state): State<AppState>,
    RequireAdminAuth(admin): RequireAdminAuth,
    PathParam(key): PathParam<String>,
) -> Result<Json<Deleted>> {
    ContentBlockRepository::new(state.pool())
        .delete(&key)
        .await
        .map_err(not_found(NOT_FOUND))?;

    tracing::info!(key = %key, "Content block deleted");
    Ok(Json(Deleted::default()))
}
