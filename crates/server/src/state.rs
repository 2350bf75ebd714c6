//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::ServerConfig;
use crate::services::ImageStorage;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ServerConfig,
    pool: PgPool,
    storage: Option<ImageStorage>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// The image storage client is built only when storage is configured.
    #[must_use]
    pub fn new(config: ServerConfig, pool: PgPool) -> Self {
        let storage = config.storage.as_ref().map(ImageStorage::new);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                storage,
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Image storage client, if R2 credentials are configured.
    #[must_use]
    pub fn storage(&self) -> Option<&ImageStorage> {
        self.inner.storage.as_ref()
    }
}
