//! Admin category management.

use axum::{Json, Router, extract::State, http::StatusCode, routing::get};
use tracing::instrument;

use teainn_core::CategoryId;

use crate::db::{CategoryRepository, ProductRepository};
use crate::error::{AppError, JsonBody, PathParam, Result, not_found};
use crate::middleware::RequireAdminAuth;
use crate::models::{Category, CategoryDetail, CategoryInput, CategoryWithCount, ProductFilter};
use crate::state::AppState;

use super::Deleted;

const NOT_FOUND: &str = "分類不存在";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/categories", get(index).post(create))
        .route("/categories/{id}", get(show).put(update).delete(destroy))
}

/// GET /api/admin/categories
#[instrument(skip(state))]
async fn index(
    State(state): State<AppState>,
    RequireAdminAuth(admin): RequireAdminAuth,
) -> Result<Json<Vec<CategoryWithCount>>> {
    Ok(Json(
        CategoryRepository::new(state.pool())
            .list_with_counts()
            .await?,
    ))
}

/// GET /api/admin/categories/{id}
///
/// The category with all of its products, active or not.
#[instrument(skip(state))]
async fn show(
    State(state): State<AppState>,
    RequireAdminAuth(admin): RequireAdminAuth,
    PathParam(id): PathParam<i32>,
) -> Result<Json<CategoryDetail>> {
    let id = CategoryId::new(id);
    let category = CategoryRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(NOT_FOUND.to_owned()))?;

    let filter = ProductFilter {
        category_id: Some(id),
        ..ProductFilter::default()
    };
    let products = ProductRepository::new(state.pool()).list(&filter).await?;

    Ok(Json(CategoryDetail { category, products }))
}

/// POST /api/admin/categories
#[instrument(skip(state, input))]
async fn create(
    State(state): State<AppState>,
    RequireAdminAuth(admin): RequireAdminAuth,
    JsonBody(input): JsonBody<CategoryInput>,
) -> Result<(StatusCode, Json<Category>)> {
    let new = input.into_new()?;
    let category = CategoryRepository::new(state.pool()).create(&new).await?;

    tracing::info!(category_id = %category.id, slug = %category.slug, "Category created");
    Ok((StatusCode::CREATED, Json(category)))
}

/// PUT /api/admin/categories/{id}
#[instrument(skip(state, input))]
async fn update(
    State(state): State<AppState>,
    RequireAdminAuth(admin): RequireAdminAuth,
    PathParam(id): PathParam<i32>,
    JsonBody(input): JsonBody<CategoryInput>,
) -> Result<Json<Category>> {
    let changes = input.into_changes()?;
    let category = CategoryRepository::new(state.pool())
        .update(CategoryId::new(id), changes)
        .await
        .map_err(not_found(NOT_FOUND))?;

    tracing::info!(category_id = %category.id, "Category updated");
    Ok(Json(category))
}

/// DELETE /api/admin/categories/{id}
///
/// Products in the category are deleted with it.
#[instrument(skip(state))]
async fn destroy(
    State(state): State<AppState>,
    RequireAdminAuth(admin): RequireAdminAuth,
    PathParam(id): PathParam<i32>,
) -> Result<Json<Deleted>> {
    CategoryRepository::new(state.pool())
        .delete(CategoryId::new(id))
        .await
        .map_err(not_found(NOT_FOUND))?;

    tracing::info!(category_id = id, "Category deleted");
    Ok(Json(Deleted::default()))
}
