//! Admin image upload to the object store.

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, State, multipart::MultipartError},
    http::StatusCode,
    routing::post,
};
use serde::Serialize;
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::middleware::RequireAdminAuth;
use crate::services::storage::{
    MAX_IMAGE_BYTES, image_extension, object_key, random_suffix, sanitize_folder,
};
use crate::state::AppState;

/// Request body cap; leaves room for multipart framing around a 5 MB file.
const UPLOAD_BODY_LIMIT: usize = 6 * 1024 * 1024;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/upload", post(upload))
        .layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT))
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub url: String,
}

/// The `file` part of the form.
#[derive(Debug)]
struct UploadedFile {
    file_name: String,
    content_type: String,
    data: Vec<u8>,
}

#[derive(Debug, Default)]
struct UploadForm {
    file: Option<UploadedFile>,
    folder: Option<String>,
}

const TOO_LARGE: &str = "檔案大小不能超過 5MB";

fn multipart_error(err: &MultipartError) -> AppError {
    tracing::debug!(error = %err.body_text(), "Rejected multipart body");
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return AppError::BadRequest(TOO_LARGE.to_owned());
    }
    AppError::BadRequest("上傳內容格式不正確".to_owned())
}

async fn read_form(mut multipart: Multipart) -> Result<UploadForm> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(&e))?
    {
        match field.name() {
            Some("file") => {
                let file_name = field.file_name().unwrap_or_default().to_owned();
                let content_type = field.content_type().unwrap_or_default().to_owned();
                let data = field.bytes().await.map_err(|e| multipart_error(&e))?;
                form.file = Some(UploadedFile {
                    file_name,
                    content_type,
                    data: data.to_vec(),
                });
            }
            Some("folder") => {
                form.folder = Some(field.text().await.map_err(|e| multipart_error(&e))?);
            }
            _ => {}
        }
    }

    Ok(form)
}

/// Upload an image.
///
/// POST /api/admin/upload
///
/// Multipart fields: `file` (required) and `folder` (default `images`).
/// Checks run in order: presence, type, size, storage configuration.
#[instrument(skip(state, multipart))]
async fn upload(
    State(state): State<AppState>,
    RequireAdminAuth(admin): RequireAdminAuth,
    multipart: Multipart,
) -> Result<Json<UploadResponse>> {
    let form = read_form(multipart).await?;

    let file = form
        .file
        .filter(|file| !file.data.is_empty())
        .ok_or_else(|| AppError::BadRequest("請選擇要上傳的檔案".to_owned()))?;

    let extension = image_extension(&file.content_type).ok_or_else(|| {
        AppError::BadRequest("只允許上傳 JPG、PNG、GIF 或 WebP 格式的圖片".to_owned())
    })?;

    if file.data.len() > MAX_IMAGE_BYTES {
        return Err(AppError::BadRequest(TOO_LARGE.to_owned()));
    }

    let folder = sanitize_folder(form.folder.as_deref())
        .ok_or_else(|| AppError::BadRequest("資料夾名稱不正確".to_owned()))?;

    let storage = state.storage().ok_or_else(|| {
        AppError::NotConfigured("圖片存儲未配置，請在環境變數中設置 R2 憑證".to_owned())
    })?;

    let key = object_key(
        &folder,
        &file.file_name,
        extension,
        chrono::Utc::now().timestamp_millis(),
        &random_suffix(),
    );
    let size = file.data.len();
    let url = storage
        .put_image(&key, &file.content_type, file.data)
        .await?;

    tracing::info!(key = %key, bytes = size, "Image uploaded");
    Ok(Json(UploadResponse { url }))
}
