//! Admin event management.

use axum::{Json, Router, extract::State, http::StatusCode, routing::get};
use tracing::instrument;

use teainn_core::EventId;

use crate::db::EventRepository;
use crate::error::{AppError, JsonBody, PathParam, Result, not_found};
use crate::middleware::RequireAdminAuth;
use crate::models::{Event, EventInput};
use crate::state::AppState;

use super::Deleted;

const NOT_FOUND: &str = "活動不存在";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/events", get(index).post(create))
        .route("/events/{id}", get(show).put(update).delete(destroy))
}

/// GET /api/admin/events
#[instrument(skip(state))]
async fn index(
    State(state): State<AppState>,
    RequireAdminAuth(admin): RequireAdminAuth,
) -> Result<Json<Vec<Event>>> {
    Ok(Json(EventRepository::new(state.pool()).list(false).await?))
}

/// GET /api/admin/events/{id}
#[instrument(skip(state))]
async fn show(
    State(state): State<AppState>,
    RequireAdminAuth(admin): RequireAdminAuth,
    PathParam(id): PathParam<i32>,
) -> Result<Json<Event>> {
    let event = EventRepository::new(state.pool())
        .get(EventId::new(id))
        .await?
        .ok_or_else(|| AppError::NotFound(NOT_FOUND.to_owned()))?;
    Ok(Json(event))
}

/// POST /api/admin/events
#[instrument(skip(state, input))]
async fn create(
    State(state): State<AppState>,
    RequireAdminAuth(admin): RequireAdminAuth,
    JsonBody(input): JsonBody<EventInput>,
) -> Result<(StatusCode, Json<Event>)> {
    let new = input.into_new()?;
    let event = EventRepository::new(state.pool()).create(&new).await?;

    tracing::info!(event_id = %event.id, slug = %event.slug, "Event created");
    Ok((StatusCode::CREATED, Json(event)))
}

/// PUT /api/admin/events/{id}
#[instrument(skip(state, input))]
async fn update(
    State(state): State<AppState>,
    RequireAdminAuth(admin): RequireAdminAuth,
    PathParam(id): PathParam<i32>,
    JsonBody(input): JsonBody<EventInput>,
) -> Result<Json<Event>> {
    let changes = input.into_changes()?;
    let event = EventRepository::new(state.pool())
        .update(EventId::new(id), changes)
        .await
        .map_err(not_found(NOT_FOUND))?;

    tracing::info!(event_id = %event.id, "Event updated");
    Ok(Json(event))
}

/// DELETE /api/admin/events/{id}
#[instrument(skip(state))]
async fn destroy(
    State(state): State<AppState>,
    RequireAdminAuth(admin): RequireAdminAuth,
    PathParam(id): PathParam<i32>,
) -> Result<Json<Deleted>> {
    EventRepository::new(state.pool())
        .delete(EventId::new(id))
        .await
        .map_err(not_found(NOT_FOUND))?;

    tracing::info!(event_id = id, "Event deleted");
    Ok(Json(Deleted::default()))
}
