//! Contact form submission.

use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;
use tracing::instrument;

use crate::db::ContactMessageRepository;
use crate::error::{JsonBody, Result};
use crate::models::ContactInput;
use crate::state::AppState;

const THANK_YOU: &str = "感謝您的訊息，我們會盡快回覆！";

#[derive(Debug, Serialize)]
pub struct ContactResponse {
    pub message: &'static str,
}

/// Submit the contact form.
///
/// POST /api/contact
///
/// Name, email and message are required; the message is stored unread for
/// the admin inbox.
#[instrument(skip(state, input))]
pub async fn submit(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<ContactInput>,
) -> Result<(StatusCode, Json<ContactResponse>)> {
    let submission = input.validate()?;

    let id = ContactMessageRepository::new(state.pool())
        .create(&submission)
        .await?;
    tracing::info!(message_id = %id, email_domain = %submission.email.domain(), "Contact message received");

    Ok((
        StatusCode::CREATED,
        Json(ContactResponse { message: THANK_YOU }),
    ))
}
