//! Admin franchise plan management.
//!
//! Updates replace every field; the slug derived at creation never changes.

use axum::{Json, Router, extract::State, http::StatusCode, routing::get};
use serde::Serialize;
use tracing::instrument;

use teainn_core::FranchisePlanId;

use crate::db::FranchisePlanRepository;
use crate::error::{AppError, JsonBody, PathParam, Result, not_found};
use crate::middleware::RequireAdminAuth;
use crate::models::{FranchisePlan, FranchisePlanInput};
use crate::state::AppState;

const NOT_FOUND: &str = "加盟方案不存在";

#[derive(Debug, Serialize)]
pub struct PlanDeleted {
    pub success: bool,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/franchise-plans", get(index).post(create))
        .route(
            "/franchise-plans/{id}",
            get(show).put(update).delete(destroy),
        )
}

/// GET /api/admin/franchise-plans
#[instrument(skip(state))]
async fn index(
    State(state): State<AppState>,
    RequireAdminAuth(admin): RequireAdminAuth,
) -> Result<Json<Vec<FranchisePlan>>> {
    Ok(Json(
        FranchisePlanRepository::new(state.pool())
            .list(false)
            .await?,
    ))
}

/// GET /api/admin/franchise-plans/{id}
#[instrument(skip(state))]
async fn show(
    State(state): State<AppState>,
    RequireAdminAuth(admin): RequireAdminAuth,
    PathParam(id): PathParam<i32>,
) -> Result<Json<FranchisePlan>> {
    let plan = FranchisePlanRepository::new(state.pool())
        .get(FranchisePlanId::new(id))
        .await?
        .ok_or_else(|| AppError::NotFound(NOT_FOUND.to_owned()))?;
    Ok(Json(plan))
}

/// POST /api/admin/franchise-plans
#[instrument(skip(state, input))]
async fn create(
    State(state): State<AppState>,
    RequireAdminAuth(admin): RequireAdminAuth,
    JsonBody(input): JsonBody<FranchisePlanInput>,
) -> Result<(StatusCode, Json<FranchisePlan>)> {
    let fields = input.into_fields()?;
    let slug = fields.derive_slug()?;
    let plan = FranchisePlanRepository::new(state.pool())
        .create(&slug, &fields)
        .await?;

    tracing::info!(plan_id = %plan.id, slug = %plan.slug, "Franchise plan created");
    Ok((StatusCode::CREATED, Json(plan)))
}

/// PUT /api/admin/franchise-plans/{id}
#[instrument(skip(state, input))]
async fn update(
    State(state): State<AppState>,
    RequireAdminAuth(admin): RequireAdminAuth,
    PathParam(id): PathParam<i32>,
    JsonBody(input): JsonBody<FranchisePlanInput>,
) -> Result<Json<FranchisePlan>> {
    let fields = input.into_fields()?;
    let plan = FranchisePlanRepository::new(state.pool())
        .replace(FranchisePlanId::new(id), &fields)
        .await
        .map_err(not_found(NOT_FOUND))?;

    tracing::info!(plan_id = %plan.id, "Franchise plan updated");
    Ok(Json(plan))
}

/// DELETE /api/admin/franchise-plans/{id}
#[instrument(skip(state))]
async fn destroy(
    State(state): State<AppState>,
    RequireAdminAuth(admin): RequireAdminAuth,
    PathParam(id): PathParam<i32>,
) -> Result<Json<PlanDeleted>> {
    FranchisePlanRepository::new(state.pool())
        .delete(FranchisePlanId::new(id))
        .await
        .map_err(not_found(NOT_FOUND))?;

    tracing::info!(plan_id = id, "Franchise plan deleted");
    Ok(Json(PlanDeleted { success: true }))
}
