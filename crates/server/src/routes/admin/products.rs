//! Admin product management, including nested sizes and toppings.

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    routing::get,
};
use serde::Deserialize;
use tracing::instrument;

use teainn_core::{CategoryId, ProductId};

use crate::db::ProductRepository;
use crate::error::{AppError, JsonBody, PathParam, Result, not_found};
use crate::middleware::RequireAdminAuth;
use crate::models::{Product, ProductFilter, ProductInput};
use crate::state::AppState;

use super::Deleted;

const NOT_FOUND: &str = "產品不存在";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/products", get(index).post(create))
        .route("/products/{id}", get(show).put(update).delete(destroy))
}

/// Query parameters for the admin product list.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminProductQuery {
    pub category_id: Option<String>,
    pub is_active: Option<String>,
}

impl AdminProductQuery {
    /// Unparseable values are ignored rather than rejected.
    fn into_filter(self) -> ProductFilter {
        let category_id = self
            .category_id
            .and_then(|raw| raw.trim().parse::<i32>().ok())
            .map(CategoryId::new);
        let active = match self.is_active.as_deref() {
            Some("true") => Some(true),
            Some("false") => Some(false),
            _ => None,
        };

        ProductFilter {
            category_id,
            active,
            ..ProductFilter::default()
        }
    }
}

/// GET /api/admin/products?categoryId=&isActive=
#[instrument(skip(state))]
async fn index(
    State(state): State<AppState>,
    RequireAdminAuth(admin): RequireAdminAuth,
    Query(query): Query<AdminProductQuery>,
) -> Result<Json<Vec<Product>>> {
    let products = ProductRepository::new(state.pool())
        .list(&query.into_filter())
        .await?;
    Ok(Json(products))
}

/// GET /api/admin/products/{id}
#[instrument(skip(state))]
async fn show(
    State(state): State<AppState>,
    RequireAdminAuth(admin): RequireAdminAuth,
    PathParam(id): PathParam<i32>,
) -> Result<Json<Product>> {
    let product = ProductRepository::new(state.pool())
        .get(ProductId::new(id))
        .await?
        .ok_or_else(|| AppError::NotFound(NOT_FOUND.to_owned()))?;
    Ok(Json(product))
}

/// POST /api/admin/products
#[instrument(skip(state, input))]
async fn create(
    State(state): State<AppState>,
    RequireAdminAuth(admin): RequireAdminAuth,
    JsonBody(input): JsonBody<ProductInput>,
) -> Result<(StatusCode, Json<Product>)> {
    let new = input.into_new()?;
    let product = ProductRepository::new(state.pool()).create(&new).await?;

    tracing::info!(
        product_id = %product.id,
        slug = %product.slug,
        sizes = product.sizes.len(),
        toppings = product.toppings.len(),
        "Product created"
    );
    Ok((StatusCode::CREATED, Json(product)))
}

/// PUT /api/admin/products/{id}
///
/// Sizes and toppings are replaced wholesale when their keys are present.
#[instrument(skip(state, input))]
async fn update(
    State(state): State<AppState>,
    RequireAdminAuth(admin): RequireAdminAuth,
    PathParam(id): PathParam<i32>,
    JsonBody(input): JsonBody<ProductInput>,
) -> Result<Json<Product>> {
    let changes = input.into_changes()?;
    let product = ProductRepository::new(state.pool())
        .update(ProductId::new(id), changes)
        .await
        .map_err(not_found(NOT_FOUND))?;

    tracing::info!(product_id = %product.id, "Product updated");
    Ok(Json(product))
}

/// DELETE /api/admin/products/{id}
#[instrument(skip(state))]
async fn destroy(
    State(state): State<AppState>,
    RequireAdminAuth(admin): RequireAdminAuth,
    PathParam(id): PathParam<i32>,
) -> Result<Json<Deleted>> {
    ProductRepository::new(state.pool())
        .delete(ProductId::new(id))
        .await
        .map_err(not_found(NOT_FOUND))?;

    tracing::info!(product_id = id, "Product deleted");
    Ok(Json(Deleted::default()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_query_parses_filters() {
        let filter = AdminProductQuery {
            category_id: Some("3".to_owned()),
            is_active: Some("false".to_owned()),
        }
        .into_filter();
        assert_eq!(filter.category_id, Some(CategoryId::new(3)));
        assert_eq!(filter.active, Some(false));
        assert!(!filter.available_toppings_only);
    }

    #[test]
    fn test_admin_query_ignores_garbage() {
        let filter = AdminProductQuery {
            category_id: Some("abc".to_owned()),
            is_active: Some("yes".to_owned()),
        }
        .into_filter();
        assert_eq!(filter.category_id, None);
        assert_eq!(filter.active, None);
    }
}
