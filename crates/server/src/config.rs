//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `TEAINN_DATABASE_URL` (or `DATABASE_URL`) - `PostgreSQL` connection string
//! - `TEAINN_BASE_URL` - Public URL of the site (https enables secure cookies)
//!
//! ## Optional
//! - `TEAINN_HOST` - Bind address (default: 127.0.0.1)
//! - `TEAINN_PORT` - Listen port (default: 3000)
//! - `LOG_FORMAT` - `json` for structured logs, anything else for text
//!
//! ## Optional (bootstrap admin)
//! - `ADMIN_USERNAME` - Username accepted when no admin row exists (default: admin)
//! - `ADMIN_PASSWORD` - Password for the bootstrap login; bootstrap is off when unset
//! - `ADMIN_DISPLAY_NAME` - Display name for the created admin (default: 管理員)
//!
//! ## Optional (image storage, S3-compatible such as Cloudflare R2)
//! - `R2_ENDPOINT` - S3 API endpoint URL
//! - `R2_ACCESS_KEY_ID` - Access key ID
//! - `R2_SECRET_ACCESS_KEY` - Secret access key
//! - `R2_BUCKET_NAME` - Bucket (default: drink)
//! - `R2_PUBLIC_URL` - Public base URL for uploaded objects
//!
//! ## Optional (error tracking)
//! - `SENTRY_DSN`, `SENTRY_ENVIRONMENT`, `SENTRY_SAMPLE_RATE`,
//!   `SENTRY_TRACES_SAMPLE_RATE`

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use url::Url;

const MIN_ADMIN_PASSWORD_LENGTH: usize = 8;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.0;
const DEFAULT_ADMIN_USERNAME: &str = "admin";
const DEFAULT_ADMIN_DISPLAY_NAME: &str = "管理員";
const DEFAULT_BUCKET: &str = "drink";

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "xxx",
    "todo",
    "insert",
    "put-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL of the site
    pub base_url: String,
    /// Emit JSON logs instead of text
    pub json_logs: bool,
    /// Credentials that may create the first admin on login
    pub bootstrap_admin: Option<BootstrapAdmin>,
    /// Object storage for image uploads (upload is disabled when absent)
    pub storage: Option<StorageConfig>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
}

/// Fallback admin credentials from the environment.
///
/// Only consulted when no admin with `username` exists yet.
#[derive(Clone)]
pub struct BootstrapAdmin {
    pub username: String,
    pub password: SecretString,
    pub display_name: String,
}

impl std::fmt::Debug for BootstrapAdmin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BootstrapAdmin")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("display_name", &self.display_name)
            .finish()
    }
}

impl BootstrapAdmin {
    /// Whether the submitted credentials are exactly the configured pair.
    #[must_use]
    pub fn matches(&self, username: &str, password: &str) -> bool {
        self.username == username && self.password.expose_secret() == password
    }

    fn from_env() -> Result<Option<Self>, ConfigError> {
        let Some(password) = get_optional_env("ADMIN_PASSWORD") else {
            return Ok(None);
        };

        if password.chars().count() < MIN_ADMIN_PASSWORD_LENGTH {
            return Err(ConfigError::InsecureSecret(
                "ADMIN_PASSWORD".to_string(),
                format!("must be at least {MIN_ADMIN_PASSWORD_LENGTH} characters"),
            ));
        }

        Ok(Some(Self {
            username: get_env_or_default("ADMIN_USERNAME", DEFAULT_ADMIN_USERNAME),
            password: SecretString::from(password),
            display_name: get_env_or_default("ADMIN_DISPLAY_NAME", DEFAULT_ADMIN_DISPLAY_NAME),
        }))
    }
}

/// S3-compatible object storage configuration.
///
/// Implements `Debug` manually to redact the secret key.
#[derive(Clone)]
pub struct StorageConfig {
    /// S3 API endpoint
    pub endpoint: String,
    pub bucket: String,
    pub access_key_id: String,
    pub secret_access_key: SecretString,
    /// Public base URL for objects; falls back to `{endpoint}/{bucket}`
    pub public_url: Option<String>,
}

impl std::fmt::Debug for StorageConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageConfig")
            .field("endpoint", &self.endpoint)
            .field("bucket", &self.bucket)
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"[REDACTED]")
            .field("public_url", &self.public_url)
            .finish()
    }
}

impl StorageConfig {
    fn from_env() -> Result<Option<Self>, ConfigError> {
        let endpoint = get_optional_env("R2_ENDPOINT");
        let access_key_id = get_optional_env("R2_ACCESS_KEY_ID");
        let secret_access_key = get_optional_env("R2_SECRET_ACCESS_KEY");

        match (endpoint, access_key_id, secret_access_key) {
            (Some(endpoint), Some(access_key_id), Some(secret)) => {
                let endpoint = validate_url(&endpoint, "R2_ENDPOINT")?;
                let public_url = get_optional_env("R2_PUBLIC_URL")
                    .map(|url| validate_url(&url, "R2_PUBLIC_URL"))
                    .transpose()?;

                Ok(Some(Self {
                    endpoint,
                    bucket: get_env_or_default("R2_BUCKET_NAME", DEFAULT_BUCKET),
                    access_key_id,
                    secret_access_key: SecretString::from(secret),
                    public_url,
                }))
            }
            (None, None, None) => Ok(None),
            _ => Err(ConfigError::InvalidEnvVar(
                "R2_*".to_string(),
                "R2_ENDPOINT, R2_ACCESS_KEY_ID and R2_SECRET_ACCESS_KEY must be set together"
                    .to_string(),
            )),
        }
    }

    /// Base URL that object keys are appended to.
    #[must_use]
    pub fn public_base(&self) -> String {
        self.public_url.clone().unwrap_or_else(|| {
            format!("{}/{}", self.endpoint.trim_end_matches('/'), self.bucket)
        })
    }
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("TEAINN_DATABASE_URL")?;
        let host = get_env_or_default("TEAINN_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("TEAINN_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("TEAINN_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("TEAINN_PORT".to_string(), e.to_string()))?;
        let base_url = validate_url(&get_required_env("TEAINN_BASE_URL")?, "TEAINN_BASE_URL")?;
        let json_logs = get_optional_env("LOG_FORMAT").is_some_and(|f| f == "json");

        let bootstrap_admin = BootstrapAdmin::from_env()?;
        let storage = StorageConfig::from_env()?;

        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = get_sample_rate("SENTRY_SAMPLE_RATE")?;
        let sentry_traces_sample_rate = get_sample_rate("SENTRY_TRACES_SAMPLE_RATE")?;

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            json_logs,
            bootstrap_admin,
            storage,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether cookies should carry the `Secure` attribute.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }

    /// Placeholder or low-entropy secrets, for logging once tracing is up.
    #[must_use]
    pub fn secret_warnings(&self) -> Vec<ConfigError> {
        let admin = self
            .bootstrap_admin
            .as_ref()
            .map(|admin| ("ADMIN_PASSWORD", &admin.password));
        let storage = self
            .storage
            .as_ref()
            .map(|storage| ("R2_SECRET_ACCESS_KEY", &storage.secret_access_key));

        admin
            .into_iter()
            .chain(storage)
            .filter_map(|(name, secret)| validate_secret_strength(secret.expose_secret(), name).err())
            .collect()
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Database URL for tools that need only the pool, such as the CLI.
///
/// # Errors
///
/// Returns `ConfigError::MissingEnvVar` if neither variable is set.
pub fn database_url_from_env() -> Result<SecretString, ConfigError> {
    let _ = dotenvy::dotenv();
    get_database_url("TEAINN_DATABASE_URL")
}

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Empty values count as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

fn get_sample_rate(key: &str) -> Result<f32, ConfigError> {
    let Some(raw) = get_optional_env(key) else {
        return Ok(1.0);
    };
    parse_sample_rate(&raw).map_err(|msg| ConfigError::InvalidEnvVar(key.to_string(), msg))
}

fn parse_sample_rate(raw: &str) -> Result<f32, String> {
    let rate = raw.trim().parse::<f32>().map_err(|e| e.to_string())?;
    if (0.0..=1.0).contains(&rate) {
        Ok(rate)
    } else {
        Err(format!("must be between 0.0 and 1.0 (got {rate})"))
    }
}

/// Parse an absolute http(s) URL and return it without a trailing slash.
fn validate_url(raw: &str, var_name: &str) -> Result<String, ConfigError> {
    let url = Url::parse(raw.trim())
        .map_err(|e| ConfigError::InvalidEnvVar(var_name.to_string(), e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            var_name.to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    Ok(url.as_str().trim_end_matches('/').to_string())
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.chars().count() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)]
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Check that a secret is not a placeholder and has reasonable entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1})"
            ),
        ));
    }

    Ok(())
}
