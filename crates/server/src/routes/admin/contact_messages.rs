//! Admin inbox for contact form messages.

use axum::{Json, Router, extract::State, routing::get};
use tracing::instrument;

use teainn_core::ContactMessageId;

use crate::db::ContactMessageRepository;
use crate::error::{AppError, JsonBody, PathParam, Result, not_found};
use crate::middleware::RequireAdminAuth;
use crate::models::{ContactMessage, ReadStatusInput};
use crate::state::AppState;

use super::Deleted;

const NOT_FOUND: &str = "訊息不存在";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/contact-messages", get(index))
        .route(
            "/contact-messages/{id}",
            get(show).put(mark_read).delete(destroy),
        )
}

/// GET /api/admin/contact-messages
#[instrument(skip(state))]
async fn index(
    State(state): State<AppState>,
    RequireAdminAuth(admin): RequireAdminAuth,
) -> Result<Json<Vec<ContactMessage>>> {
    Ok(Json(ContactMessageRepository::new(state.pool()).list().await?))
}

/// GET /api/admin/contact-messages/{id}
#[instrument(skip(state))]
async fn show(
    State(state): State<AppState>,
    RequireAdminAuth(admin): RequireAdminAuth,
    PathParam(id): PathParam<i32>,
) -> Result<Json<ContactMessage>> {
    let message = ContactMessageRepository::new(state.pool())
        .get(ContactMessageId::new(id))
        .await?
        .ok_or_else(|| AppError::NotFound(NOT_FOUND.to_owned()))?;
    Ok(Json(message))
}

/// PUT /api/admin/contact-messages/{id}
///
/// A body without `isRead` marks the message read.
#[instrument(skip(state))]
async fn mark_read(
    State(state): State<AppState>,
    RequireAdminAuth(admin): RequireAdminAuth,
    PathParam(id): PathParam<i32>,
    JsonBody(input): JsonBody<ReadStatusInput>,
) -> Result<Json<ContactMessage>> {
    let message = ContactMessageRepository::new(state.pool())
        .set_read(ContactMessageId::new(id), input.is_read())
        .await
        .map_err(not_found(NOT_FOUND))?;

    tracing::info!(message_id = %message.id, is_read = message.is_read, "Contact message updated");
    Ok(Json(message))
}

/// DELETE /api/admin/contact-messages/{id}
#[instrument(skip(state))]
async fn destroy(
    State(state): State<AppState>,
    RequireAdminAuth(admin): RequireAdminAuth,
    PathParam(id): PathParam<i32>,
) -> Result<Json<Deleted>> {
    ContactMessageRepository::new(state.pool())
        .delete(ContactMessageId::new(id))
        .await
        .map_err(not_found(NOT_FOUND))?;

    tracing::info!(message_id = id, "Contact message deleted");
    Ok(Json(Deleted::default()))
}
