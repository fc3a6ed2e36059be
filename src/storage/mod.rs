//! Blob access
//!
//! Documents arrive as already-uploaded blobs referenced by URL. This module
//! only covers the fetch side; upload mechanics belong to the storage
//! provider and never touch this server.

use async_trait::async_trait;

use crate::config::BlobConfig;
use crate::error::{AppError, Result};

/// Fetches blob bytes by URL
///
/// Trait seam so the document service can be exercised in tests without a
/// live object store.
#[async_trait]
pub trait BlobFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

/// HTTP-backed blob fetcher
pub struct HttpBlobClient {
    client: reqwest::Client,
    max_bytes: usize,
}

impl HttpBlobClient {
    pub fn new(config: &BlobConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.fetch_timeout_secs))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            max_bytes: config.max_blob_bytes,
        })
    }
}

#[async_trait]
impl BlobFetcher for HttpBlobClient {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        tracing::debug!("Fetching blob from {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| AppError::BlobFetch(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AppError::BlobFetch(format!(
                "{} returned status {}",
                url,
                response.status()
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| AppError::BlobFetch(e.to_string()))?;

        if bytes.len() > self.max_bytes {
            return Err(AppError::BlobFetch(format!(
                "blob of {} bytes exceeds the {} byte limit",
                bytes.len(),
                self.max_bytes
            )));
        }

        Ok(bytes.to_vec())
    }
}
