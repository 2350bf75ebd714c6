//! Image storage on an S3-compatible bucket (Cloudflare R2).
//!
//! Objects are stored under `{folder}/{base}-{millis}-{suffix}.{ext}` and
//! served from the configured public URL.

use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_s3::primitives::ByteStream;
use rand::Rng;
use secrecy::ExposeSecret;
use thiserror::Error;

use crate::config::StorageConfig;

/// Largest accepted upload.
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Folder used when the form does not name one.
pub const DEFAULT_FOLDER: &str = "images";

const SUFFIX_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const SUFFIX_LEN: usize = 6;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("upload failed: {0}")]
    Upload(String),
}

/// Client for the image bucket.
#[derive(Clone)]
pub struct ImageStorage {
    client: aws_sdk_s3::Client,
    bucket: String,
    public_base: String,
}

impl ImageStorage {
    /// Build a client for an R2-style endpoint with static credentials.
    #[must_use]
    pub fn new(config: &StorageConfig) -> Self {
        let credentials = Credentials::new(
            &config.access_key_id,
            config.secret_access_key.expose_secret(),
            None,
            None,
            "teainn-env",
        );
        let s3_config = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new("auto"))
            .endpoint_url(&config.endpoint)
            .credentials_provider(credentials)
            .force_path_style(true)
            .build();

        Self {
            client: aws_sdk_s3::Client::from_conf(s3_config),
            bucket: config.bucket.clone(),
            public_base: config.public_base().trim_end_matches('/').to_owned(),
        }
    }

    /// Store `data` under `key` and return its public URL.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Upload` if the bucket rejects the object.
    pub async fn put_image(
        &self,
        key: &str,
        content_type: &str,
        data: Vec<u8>,
    ) -> Result<String, StorageError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(data))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| StorageError::Upload(e.to_string()))?;

        Ok(self.public_url(key))
    }

    #[must_use]
    pub fn public_url(&self, key: &str) -> String {
        format!("{}/{key}", self.public_base)
    }
}

/// File extension for an accepted image MIME type.
#[must_use]
pub fn image_extension(content_type: &str) -> Option<&'static str> {
    match content_type.trim().to_ascii_lowercase().as_str() {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/gif" => Some("gif"),
        "image/webp" => Some("webp"),
        _ => None,
    }
}

const fn is_cjk_ideograph(c: char) -> bool {
    matches!(c, '\u{4e00}'..='\u{9fa5}')
}

/// Turn an uploaded file name into a key-safe base name: the extension is
/// dropped, characters outside ASCII letters/digits and CJK ideographs
/// become `-`, and the result is lowercased.
#[must_use]
pub fn sanitize_base_name(file_name: &str) -> String {
    let stem = match file_name.rfind('.') {
        Some(dot) => file_name.get(..dot).unwrap_or(file_name),
        None => file_name,
    };

    let base: String = stem
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || is_cjk_ideograph(c) {
                c.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect();

    if base.is_empty() {
        "image".to_owned()
    } else {
        base
    }
}

/// Normalize the requested folder. Blank means [`DEFAULT_FOLDER`]; traversal
/// segments and characters outside `[A-Za-z0-9_-/]` are rejected.
#[must_use]
pub fn sanitize_folder(raw: Option<&str>) -> Option<String> {
    let folder = raw.map(str::trim).unwrap_or_default().trim_matches('/');
    if folder.is_empty() {
        return Some(DEFAULT_FOLDER.to_owned());
    }

    let valid = folder.split('/').all(|segment| {
        !segment.is_empty()
            && segment != "."
            && segment != ".."
            && segment
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    });

    valid.then(|| folder.to_owned())
}

/// Random lowercase base-36 suffix.
#[must_use]
pub fn random_suffix() -> String {
    let mut rng = rand::rng();
    (0..SUFFIX_LEN)
        .map(|_| {
            let idx = rng.random_range(0..SUFFIX_ALPHABET.len());
            char::from(SUFFIX_ALPHABET.get(idx).copied().unwrap_or(b'0'))
        })
        .collect()
}

/// Build the object key for an upload.
#[must_use]
pub fn object_key(
    folder: &str,
    file_name: &str,
    extension: &str,
    millis: i64,
    suffix: &str,
) -> String {
    let base = sanitize_base_name(file_name);
    format!("{folder}/{base}-{millis}-{suffix}.{extension}")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::SecretString;

    use super::*;

    #[test]
    fn test_image_extension() {
        assert_eq!(image_extension("image/jpeg"), Some("jpg"));
        assert_eq!(image_extension("image/PNG"), Some("png"));
        assert_eq!(image_extension("image/webp"), Some("webp"));
        assert_eq!(image_extension("image/svg+xml"), None);
        assert_eq!(image_extension("application/pdf"), None);
    }

    #[test]
    fn test_sanitize_base_name() {
        assert_eq!(sanitize_base_name("Pearl Milk Tea.PNG"), "pearl-milk-tea");
        assert_eq!(sanitize_base_name("珍珠奶茶_大杯.jpg"), "珍珠奶茶-大杯");
        assert_eq!(sanitize_base_name("photo.final.jpeg"), "photo-final");
        assert_eq!(sanitize_base_name(".jpg"), "image");
        assert_eq!(sanitize_base_name(""), "image");
    }

    #[test]
    fn test_sanitize_folder() {
        assert_eq!(sanitize_folder(None).unwrap(), "images");
        assert_eq!(sanitize_folder(Some("  ")).unwrap(), "images");
        assert_eq!(sanitize_folder(Some("products/2025")).unwrap(), "products/2025");
        assert_eq!(sanitize_folder(Some("/stores/")).unwrap(), "stores");
        assert!(sanitize_folder(Some("../secrets")).is_none());
        assert!(sanitize_folder(Some("a//b")).is_none());
        assert!(sanitize_folder(Some("with space")).is_none());
    }

    #[test]
    fn test_random_suffix_shape() {
        let suffix = random_suffix();
        assert_eq!(suffix.len(), 6);
        assert!(
            suffix
                .chars()
                .all(|c| c.is_ascii_digit() || c.is_ascii_lowercase())
        );
    }

    #[test]
    fn test_object_key_layout() {
        let key = object_key("images", "Logo.png", "png", 1_700_000_000_000, "a1b2c3");
        assert_eq!(key, "images/logo-1700000000000-a1b2c3.png");
    }

    #[tokio::test]
    async fn test_public_url_uses_configured_base() {
        let storage = ImageStorage::new(&StorageConfig {
            endpoint: "https://account.r2.cloudflarestorage.com".to_owned(),
            bucket: "drink".to_owned(),
            access_key_id: "key".to_owned(),
            secret_access_key: SecretString::from("secret"),
            public_url: Some("https://cdn.teainn.tw/".to_owned()),
        });
        assert_eq!(
            storage.public_url("images/a.png"),
            "https://cdn.teainn.tw/images/a.png"
        );
    }
}
