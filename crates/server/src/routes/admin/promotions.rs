//! Admin promotion management.

use axum::{Json, Router, extract::State, http::StatusCode, routing::get};
use tracing::instrument;

use teainn_core::PromotionId;

use crate::db::PromotionRepository;
use crate::error::{AppError, JsonBody, PathParam, Result, not_found};
use crate::middleware::RequireAdminAuth;
use crate::models::{Promotion, PromotionInput};
use crate::state::AppState;

use super::Deleted;

const NOT_FOUND: &str = "促銷不存在";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/promotions", get(index).post(create))
        .route("/promotions/{id}", get(show).put(update).delete(destroy))
}

/// GET /api/admin/promotions
#[instrument(skip(state))]
async fn index(
    State(state): State<AppState>,
    RequireAdminAuth(admin): RequireAdminAuth,
) -> Result<Json<Vec<Promotion>>> {
    Ok(Json(PromotionRepository::new(state.pool()).list(false).await?))
}

/// GET /api/admin/promotions/{id}
#[instrument(skip(state))]
async fn show(
    State(state): State<AppState>,
    RequireAdminAuth(admin): RequireAdminAuth,
    PathParam(id): PathParam<i32>,
) -> Result<Json<Promotion>> {
    let promotion = PromotionRepository::new(state.pool())
        .get(PromotionId::new(id))
        .await?
        .ok_or_else(|| AppError::NotFound(NOT_FOUND.to_owned()))?;
    Ok(Json(promotion))
}

/// POST /api/admin/promotions
#[instrument(skip(state, input))]
async fn create(
    State(state): State<AppState>,
    RequireAdminAuth(admin): RequireAdminAuth,
    JsonBody(input): JsonBody<PromotionInput>,
) -> Result<(StatusCode, Json<Promotion>)> {
    let new = input.into_new()?;
    let promotion = PromotionRepository::new(state.pool()).create(&new).await?;

    tracing::info!(promotion_id = %promotion.id, "Promotion created");
    Ok((StatusCode::CREATED, Json(promotion)))
}

/// PUT /api/admin/promotions/{id}
#[instrument(skip(state, input))]
async fn update(
    State(state): State<AppState>,
    RequireAdminAuth(admin): RequireAdminAuth,
    PathParam(id): PathParam<i32>,
    JsonBody(input): JsonBody<PromotionInput>,
) -> Result<Json<Promotion>> {
    let promotion = PromotionRepository::new(state.pool())
        .update(PromotionId::new(id), input.into_changes())
        .await
        .map_err(not_found(NOT_FOUND))?;

    tracing::info!(promotion_id = %promotion.id, "Promotion updated");
    Ok(Json(promotion))
}

/// DELETE /api/admin/promotions/{id}
#[instrument(skip(state))]
async fn destroy(
    State(state): State<AppState>,
    RequireAdminAuth(admin): RequireAdminAuth,
    PathParam(id): PathParam<i32>,
) -> Result<Json<Deleted>> {
    PromotionRepository::new(state.pool())
        .delete(PromotionId::new(id))
        .await
        .map_err(not_found(NOT_FOUND))?;

    tracing::info!(promotion_id = id, "Promotion deleted");
    Ok(Json(Deleted::default()))
}
