//! Unified error handling with Sentry integration.
//!
//! Route handlers return `Result<T, AppError>`. Every error renders as
//! `{"error": "<message>"}`; server-side failures are captured to Sentry and
//! answered with a generic message.

use axum::{
    Json,
    extract::{
        FromRequest, FromRequestParts,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::models::ValidationError;
use crate::services::{AuthError, StorageError};

const INTERNAL_MESSAGE: &str = "伺服器錯誤，請稍後再試";

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Object storage operation failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Request body failed validation.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// Resource not found.
    #[error("{0}")]
    NotFound(String),

    /// Admin is not authenticated.
    #[error("{0}")]
    Unauthorized(String),

    /// Bad request from client.
    #[error("{0}")]
    BadRequest(String),

    /// A feature needs configuration that is missing.
    #[error("{0}")]
    NotConfigured(String),

    /// Rate limited.
    #[error("Rate limited")]
    RateLimited,

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// JSON error body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Database(err) => match err {
                RepositoryError::NotFound => StatusCode::NOT_FOUND,
                RepositoryError::Conflict(_) => StatusCode::CONFLICT,
                RepositoryError::InvalidReference(_) => StatusCode::BAD_REQUEST,
                RepositoryError::Database(_) | RepositoryError::DataCorruption(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials | AuthError::AdminNotFound => {
                    StatusCode::UNAUTHORIZED
                }
                AuthError::AdminAlreadyExists => StatusCode::CONFLICT,
                AuthError::WeakPassword(_) | AuthError::InvalidUsername => StatusCode::BAD_REQUEST,
                AuthError::Repository(_) | AuthError::PasswordHash => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::Storage(_) | Self::NotConfigured(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::Validation(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
        }
    }

    // Don't expose internal error details to clients
    fn client_message(&self) -> String {
        match self {
            Self::Database(err) => match err {
                RepositoryError::NotFound => "資料不存在".to_owned(),
                RepositoryError::Conflict(msg) | RepositoryError::InvalidReference(msg) => {
                    msg.clone()
                }
                RepositoryError::Database(_) | RepositoryError::DataCorruption(_) => {
                    INTERNAL_MESSAGE.to_owned()
                }
            },
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials => "帳號或密碼錯誤".to_owned(),
                AuthError::AdminNotFound => "未授權".to_owned(),
                AuthError::AdminAlreadyExists => "帳號已存在".to_owned(),
                AuthError::InvalidUsername => "帳號格式不正確".to_owned(),
                AuthError::WeakPassword(msg) => msg.clone(),
                AuthError::Repository(_) | AuthError::PasswordHash => INTERNAL_MESSAGE.to_owned(),
            },
            Self::Storage(_) => "上傳失敗".to_owned(),
            Self::Internal(_) => INTERNAL_MESSAGE.to_owned(),
            Self::RateLimited => "請求過於頻繁，請稍後再試".to_owned(),
            Self::Validation(_)
            | Self::NotFound(_)
            | Self::Unauthorized(_)
            | Self::BadRequest(_)
            | Self::NotConfigured(_) => self.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let body = ErrorBody {
            error: self.client_message(),
        };
        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(error = %rejection.body_text(), "Rejected JSON body");
        Self::BadRequest("請求格式不正確".to_owned())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        tracing::debug!(error = %rejection.body_text(), "Rejected path parameter");
        Self::BadRequest("無效的 ID".to_owned())
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// `axum::Json` whose rejections render as [`AppError`].
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct JsonBody<T>(pub T);

/// `axum::extract::Path` whose rejections render as [`AppError`].
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct PathParam<T>(pub T);

/// Map a repository `NotFound` to a 404 carrying `message`; other errors
/// pass through.
pub fn not_found(message: &'static str) -> impl Fn(RepositoryError) -> AppError {
    move |err| match err {
        RepositoryError::NotFound => AppError::NotFound(message.to_owned()),
        other => AppError::Database(other),
    }
}

/// Set the Sentry user context from an admin ID.
///
/// Call this after successful authentication to associate errors with admins.
pub fn set_sentry_user(admin_id: &impl ToString, username: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(admin_id.to_string()),
            username: username.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn status_of(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    async fn body_of(err: AppError) -> serde_json::Value {
        let bytes = axum::body::to_bytes(err.into_response().into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            status_of(AppError::NotFound("產品不存在".to_owned())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(AppError::Unauthorized("未授權".to_owned())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status_of(AppError::Validation(ValidationError::new("標題為必填"))),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(AppError::Database(RepositoryError::Conflict("slug 已被使用".into()))),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(AppError::Database(RepositoryError::InvalidReference(
                "分類不存在".into()
            ))),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(AppError::Auth(AuthError::InvalidCredentials)),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(status_of(AppError::RateLimited), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            status_of(AppError::Internal("boom".to_owned())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_error_body_is_json() {
        let body = body_of(AppError::NotFound("產品不存在".to_owned())).await;
        assert_eq!(body, serde_json::json!({"error": "產品不存在"}));
    }

    #[tokio::test]
    async fn test_internal_details_are_hidden() {
        let body = body_of(AppError::Database(RepositoryError::DataCorruption(
            "invalid slug in database".to_owned(),
        )))
        .await;
        assert_eq!(body["error"], INTERNAL_MESSAGE);

        let body = body_of(AppError::Storage(StorageError::Upload(
            "AccessDenied".to_owned(),
        )))
        .await;
        assert_eq!(body["error"], "上傳失敗");
    }

    #[test]
    fn test_not_found_mapper() {
        let map = not_found("活動不存在");
        assert!(matches!(map(RepositoryError::NotFound), AppError::NotFound(m) if m == "活動不存在"));
        assert!(matches!(
            map(RepositoryError::Conflict("x".into())),
            AppError::Database(RepositoryError::Conflict(_))
        ));
    }
}
