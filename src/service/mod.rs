//! Document service
//!
//! Orchestrates ingestion, content resolution and revision saves over the
//! repository, the PDF extractor and the content formatter.

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::db::{Document, DocumentRepository, Revision};
use crate::error::{AppError, Result};
use crate::html;
use crate::pdf;
use crate::storage::BlobFetcher;

/// The content target of a read: a whole document, one historical revision,
/// or nothing selected at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentSelector {
    Document(String),
    Revision(String),
    None,
}

impl ContentSelector {
    /// Build a selector from the two optional ids of the wire format
    ///
    /// A revision id wins over a document id when both are present.
    pub fn from_params(document_id: Option<String>, revision_id: Option<String>) -> Self {
        match (revision_id, document_id) {
            (Some(rev), _) => ContentSelector::Revision(rev),
            (None, Some(doc)) => ContentSelector::Document(doc),
            (None, None) => ContentSelector::None,
        }
    }
}

/// Service layer over documents and revisions
#[derive(Clone)]
pub struct DocumentService {
    pool: SqlitePool,
    blobs: Arc<dyn BlobFetcher>,
}

impl DocumentService {
    pub fn new(pool: SqlitePool, blobs: Arc<dyn BlobFetcher>) -> Self {
        Self { pool, blobs }
    }

    /// Ingest an uploaded PDF blob and create its document
    ///
    /// Fetches the blob, extracts its text and inserts the document in one
    /// pass. Any fetch or extraction failure aborts the whole operation with
    /// no document row created.
    pub async fn ingest(&self, name: &str, url: &str) -> Result<Document> {
        let bytes = self.blobs.fetch(url).await?;

        tracing::info!("Extracting text from {} ({} bytes)", name, bytes.len());

        // Extraction is CPU-bound, keep it off the async workers
        let content = tokio::task::spawn_blocking(move || pdf::extract_text(&bytes))
            .await
            .map_err(|e| AppError::Internal(format!("extraction task failed: {}", e)))?
            .map_err(|e| AppError::Extraction(e.to_string()))?;

        let repo = DocumentRepository::new(&self.pool);
        let document = repo.create_document(name, &content).await?;

        tracing::info!("Created document {} from {}", document.id, name);

        Ok(document)
    }

    /// Resolve the display markup for a selector
    ///
    /// A document selector resolves to the latest revision when one exists
    /// and falls back to the originally extracted content otherwise. A
    /// revision selector pins that historical snapshot.
    pub async fn resolve_content(&self, selector: &ContentSelector) -> Result<String> {
        let repo = DocumentRepository::new(&self.pool);

        let stored = match selector {
            ContentSelector::Revision(id) => {
                repo.get_revision(id)
                    .await?
                    .ok_or_else(|| AppError::NotFound(format!("Revision not found: {}", id)))?
                    .content
            }
            ContentSelector::Document(id) => {
                let document = repo
                    .get_document(id)
                    .await?
                    .ok_or_else(|| AppError::NotFound(format!("Document not found: {}", id)))?;

                match repo.latest_revision(id).await? {
                    Some(revision) => revision.content,
                    None => document.content,
                }
            }
            ContentSelector::None => return Err(AppError::NoSelection),
        };

        Ok(html::to_display(&stored))
    }

    /// Persist editor markup as a new revision of a document
    pub async fn save(&self, document_id: &str, markup: &str) -> Result<Revision> {
        let stored = html::to_storage(markup);

        let repo = DocumentRepository::new(&self.pool);
        let revision = repo.create_revision(document_id, &stored).await?;

        tracing::info!(
            "Created revision {} for document {}",
            revision.id,
            document_id
        );

        Ok(revision)
    }

    /// List all documents with their revision histories
    pub async fn list(&self) -> Result<Vec<Document>> {
        let repo = DocumentRepository::new(&self.pool);
        repo.list_documents().await
    }
}
