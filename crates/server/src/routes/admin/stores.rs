//! Admin store (branch location) management.

use axum::{Json, Router, extract::State, http::StatusCode, routing::get};
use tracing::instrument;

use teainn_core::StoreId;

use crate::db::StoreRepository;
use crate::error::{AppError, JsonBody, PathParam, Result, not_found};
use crate::middleware::RequireAdminAuth;
use crate::models::{Store, StoreInput};
use crate::state::AppState;

use super::Deleted;

const NOT_FOUND: &str = "門市不存在";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/stores", get(index).post(create))
        .route("/stores/{id}", get(show).put(update).delete(destroy))
}

/// GET /api/admin/stores
#[instrument(skip(state))]
async fn index(
    State(state): State<AppState>,
    RequireAdminAuth(admin): RequireAdminAuth,
) -> Result<Json<Vec<Store>>> {
    Ok(Json(StoreRepository::new(state.pool()).list(false).await?))
}

/// GET /api/admin/stores/{id}
#[instrument(skip(state))]
async fn show(
    State(state): State<AppState>,
    RequireAdminAuth(admin): RequireAdminAuth,
    PathParam(id): PathParam<i32>,
) -> Result<Json<Store>> {
    let store = StoreRepository::new(state.pool())
        .get(StoreId::new(id))
        .await?
        .ok_or_else(|| AppError::NotFound(NOT_FOUND.to_owned()))?;
    Ok(Json(store))
}

/// POST /api/admin/stores
#[instrument(skip(state, input))]
async fn create(
    State(state): State<AppState>,
    RequireAdminAuth(admin): RequireAdminAuth,
    JsonBody(input): JsonBody<StoreInput>,
) -> Result<(StatusCode, Json<Store>)> {
    let new = input.into_new()?;
    let store = StoreRepository::new(state.pool()).create(&new).await?;

    tracing::info!(store_id = %store.id, slug = %store.slug, "Store created");
    Ok((StatusCode::CREATED, Json(store)))
}

/// PUT /api/admin/stores/{id}
#[instrument(skip(state, input))]
async fn update(
    State(state): State<AppState>,
    RequireAdminAuth(admin): RequireAdminAuth,
    PathParam(id): PathParam<i32>,
    JsonBody(input): JsonBody<StoreInput>,
) -> Result<Json<Store>> {
    let changes = input.into_changes()?;
    let store = StoreRepository::new(state.pool())
        .update(StoreId::new(id), changes)
        .await
        .map_err(not_found(NOT_FOUND))?;

    tracing::info!(store_id = %store.id, "Store updated");
    Ok(Json(store))
}

/// DELETE /api/admin/stores/{id}
#[instrument(skip(state))]
async fn destroy(
    State(state): State<AppState>,
    RequireAdminAuth(admin): RequireAdminAuth,
    PathParam(id): PathParam<i32>,
) -> Result<Json<Deleted>> {
    StoreRepository::new(state.pool())
        .delete(StoreId::new(id))
        .await
        .map_err(not_found(NOT_FOUND))?;

    tracing::info!(store_id = id, "Store deleted");
    Ok(Json(Deleted::default()))
}
