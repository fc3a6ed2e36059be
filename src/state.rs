//! Application state management

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::config::Config;
use crate::error::Result;
use crate::service::DocumentService;
use crate::storage::{BlobFetcher, HttpBlobClient};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: Config,
    db: SqlitePool,
    service: DocumentService,
}

impl AppState {
    /// Create the shared state with an HTTP-backed blob fetcher
    pub fn new(config: Config, db: SqlitePool) -> Result<Self> {
        let blobs: Arc<dyn BlobFetcher> = Arc::new(HttpBlobClient::new(&config.blob)?);
        Ok(Self::with_blob_fetcher(config, db, blobs))
    }

    /// Create the shared state with a custom blob fetcher (used by tests)
    pub fn with_blob_fetcher(config: Config, db: SqlitePool, blobs: Arc<dyn BlobFetcher>) -> Self {
        let service = DocumentService::new(db.clone(), blobs);
        Self {
            inner: Arc::new(AppStateInner {
                config,
                db,
                service,
            }),
        }
    }

    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    pub fn db(&self) -> &SqlitePool {
        &self.inner.db
    }

    pub fn service(&self) -> &DocumentService {
        &self.inner.service
    }
}
