//! Public read API feeding the marketing site.
//!
//! Every listing returns active records only, in display order.

use std::collections::BTreeMap;

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use serde_json::Value;
use tracing::instrument;

use crate::db::{
    CategoryRepository, ContentBlockRepository, EventRepository, FranchisePlanRepository,
    ProductRepository, PromotionRepository, SettingsRepository, StoreRepository,
};
use crate::error::{AppError, PathParam, Result};
use crate::models::{
    Event, FranchisePlan, Product, ProductFilter, Promotion, PublicCategory, Store,
};
use crate::state::AppState;

/// Query parameters for `GET /api/products`.
#[derive(Debug, Default, Deserialize)]
pub struct ProductQuery {
    /// Category slug.
    pub category: Option<String>,
    /// Only `"true"` enables the filter.
    pub featured: Option<String>,
}

impl ProductQuery {
    fn into_filter(self) -> ProductFilter {
        let category = self
            .category
            .map(|slug| slug.trim().to_owned())
            .filter(|slug| !slug.is_empty());
        ProductFilter::public(category, self.featured.as_deref() == Some("true"))
    }
}

/// GET /api/categories
#[instrument(skip(state))]
pub async fn categories(State(state): State<AppState>) -> Result<Json<Vec<PublicCategory>>> {
    let categories = CategoryRepository::new(state.pool()).list_active().await?;
    Ok(Json(categories.into_iter().map(Into::into).collect()))
}

/// GET /api/products?category=<slug>&featured=true
#[instrument(skip(state))]
pub async fn products(
    State(state): State<AppState>,
    Query(query): Query<ProductQuery>,
) -> Result<Json<Vec<Product>>> {
    let products = ProductRepository::new(state.pool())
        .list(&query.into_filter())
        .await?;
    Ok(Json(products))
}

/// GET /api/stores
#[instrument(skip(state))]
pub async fn stores(State(state): State<AppState>) -> Result<Json<Vec<Store>>> {
    Ok(Json(StoreRepository::new(state.pool()).list(true).await?))
}

/// GET /api/events
#[instrument(skip(state))]
pub async fn events(State(state): State<AppState>) -> Result<Json<Vec<Event>>> {
    Ok(Json(EventRepository::new(state.pool()).list(true).await?))
}

/// GET /api/events/{slug}
///
/// Inactive events are hidden with their own message.
#[instrument(skip(state))]
pub async fn event(
    State(state): State<AppState>,
    PathParam(slug): PathParam<String>,
) -> Result<Json<Event>> {
    let event = EventRepository::new(state.pool())
        .get_by_slug(&slug)
        .await?
        .ok_or_else(|| AppError::NotFound("活動不存在".to_owned()))?;

    if !event.is_active {
        return Err(AppError::NotFound("活動已下架".to_owned()));
    }
    Ok(Json(event))
}

/// GET /api/promotions
#[instrument(skip(state))]
pub async fn promotions(State(state): State<AppState>) -> Result<Json<Vec<Promotion>>> {
    Ok(Json(PromotionRepository::new(state.pool()).list(true).await?))
}

/// GET /api/franchise-plans
#[instrument(skip(state))]
pub async fn franchise_plans(State(state): State<AppState>) -> Result<Json<Vec<FranchisePlan>>> {
    Ok(Json(FranchisePlanRepository::new(state.pool()).list(true).await?))
}

/// GET /api/settings
#[instrument(skip(state))]
pub async fn settings(State(state): State<AppState>) -> Result<Json<BTreeMap<String, String>>> {
    Ok(Json(SettingsRepository::new(state.pool()).get_all().await?))
}

/// GET /api/content/{key}
///
/// Returns the bare payload.
#[instrument(skip(state))]
pub async fn content(
    State(state): State<AppState>,
    PathParam(key): PathParam<String>,
) -> Result<Json<Value>> {
    let block = ContentBlockRepository::new(state.pool())
        .get(&key)
        .await?
        .ok_or_else(|| AppError::NotFound("內容區塊不存在".to_owned()))?;
    Ok(Json(block.payload))
}
