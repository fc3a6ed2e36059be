//! Document and revision database operations

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::error::{AppError, Result};

/// A document record with its revision history
///
/// The `content` column is the text extracted at ingestion time. It is never
/// updated; edits land in `revisions` instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: String,
    pub name: String,
    pub content: String,
    pub created_at: String,
    #[serde(default)]
    pub revisions: Vec<Revision>,
}

/// Raw `documents` row, before revisions are attached
#[derive(sqlx::FromRow)]
struct DocumentRow {
    id: String,
    name: String,
    content: String,
    created_at: String,
}

impl From<DocumentRow> for Document {
    fn from(row: DocumentRow) -> Self {
        Document {
            id: row.id,
            name: row.name,
            content: row.content,
            created_at: row.created_at,
            revisions: Vec::new(),
        }
    }
}

/// An immutable content snapshot of a document
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Revision {
    pub id: String,
    pub document_id: String,
    pub content: String,
    pub created_at: String,
}

/// Repository for document persistence
pub struct DocumentRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> DocumentRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new document with zero revisions
    pub async fn create_document(&self, name: &str, content: &str) -> Result<Document> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            r#"
            INSERT INTO documents (id, name, content, created_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(name)
        .bind(content)
        .bind(&now)
        .execute(self.pool)
        .await?;

        Ok(Document {
            id,
            name: name.to_string(),
            content: content.to_string(),
            created_at: now,
            revisions: Vec::new(),
        })
    }

    /// Append a revision to an existing document
    ///
    /// Fails with `NotFound` (and inserts nothing) when the document id does
    /// not reference an existing document.
    pub async fn create_revision(&self, document_id: &str, content: &str) -> Result<Revision> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM documents WHERE id = ?)")
            .bind(document_id)
            .fetch_one(self.pool)
            .await?;

        if !exists {
            return Err(AppError::NotFound(format!(
                "Document not found: {}",
                document_id
            )));
        }

        let id = Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            r#"
            INSERT INTO revisions (id, document_id, content, created_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(document_id)
        .bind(content)
        .bind(&now)
        .execute(self.pool)
        .await?;

        Ok(Revision {
            id,
            document_id: document_id.to_string(),
            content: content.to_string(),
            created_at: now,
        })
    }

    /// Fetch a single document row (without its revisions)
    pub async fn get_document(&self, id: &str) -> Result<Option<Document>> {
        let row = sqlx::query_as::<_, DocumentRow>(
            r#"
            SELECT id, name, content, created_at
            FROM documents
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Document::from))
    }

    /// Fetch a single revision by id
    pub async fn get_revision(&self, id: &str) -> Result<Option<Revision>> {
        let revision = sqlx::query_as::<_, Revision>(
            r#"
            SELECT id, document_id, content, created_at
            FROM revisions
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(revision)
    }

    /// Fetch the most recent revision of a document, if any
    pub async fn latest_revision(&self, document_id: &str) -> Result<Option<Revision>> {
        let revision = sqlx::query_as::<_, Revision>(
            r#"
            SELECT id, document_id, content, created_at
            FROM revisions
            WHERE document_id = ?
            ORDER BY created_at DESC, id DESC
            LIMIT 1
            "#,
        )
        .bind(document_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(revision)
    }

    /// List all documents with their full revision collections
    ///
    /// Documents come back newest-created-first; each document's revisions
    /// oldest-first so they can be labelled "Revision 1, Revision 2, ...".
    pub async fn list_documents(&self) -> Result<Vec<Document>> {
        let mut documents: Vec<Document> = sqlx::query_as::<_, DocumentRow>(
            r#"
            SELECT id, name, content, created_at
            FROM documents
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .fetch_all(self.pool)
        .await?
        .into_iter()
        .map(Document::from)
        .collect();

        let revisions = sqlx::query_as::<_, Revision>(
            r#"
            SELECT id, document_id, content, created_at
            FROM revisions
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .fetch_all(self.pool)
        .await?;

        for revision in revisions {
            if let Some(document) = documents
                .iter_mut()
                .find(|d| d.id == revision.document_id)
            {
                document.revisions.push(revision);
            }
        }

        Ok(documents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::initialize_schema;

    async fn setup_test_db() -> SqlitePool {
        let pool = SqlitePool::connect(":memory:").await.unwrap();
        initialize_schema(&pool).await.unwrap();
        pool
    }

    async fn seed_document(pool: &SqlitePool, id: &str, name: &str, created_at: &str) {
        sqlx::query("INSERT INTO documents (id, name, content, created_at) VALUES (?, ?, '', ?)")
            .bind(id)
            .bind(name)
            .bind(created_at)
            .execute(pool)
            .await
            .unwrap();
    }

    async fn seed_revision(pool: &SqlitePool, id: &str, document_id: &str, created_at: &str) {
        sqlx::query(
            "INSERT INTO revisions (id, document_id, content, created_at) VALUES (?, ?, '', ?)",
        )
        .bind(id)
        .bind(document_id)
        .bind(created_at)
        .execute(pool)
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_create_and_get_document() {
        let pool = setup_test_db().await;
        let repo = DocumentRepository::new(&pool);

        let created = repo.create_document("report.pdf", "hello").await.unwrap();
        assert!(created.revisions.is_empty());

        let loaded = repo.get_document(&created.id).await.unwrap().unwrap();
        assert_eq!(loaded.name, "report.pdf");
        assert_eq!(loaded.content, "hello");
    }

    #[tokio::test]
    async fn test_get_document_missing() {
        let pool = setup_test_db().await;
        let repo = DocumentRepository::new(&pool);

        assert!(repo.get_document("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create_revision_and_get() {
        let pool = setup_test_db().await;
        let repo = DocumentRepository::new(&pool);

        let document = repo.create_document("a.pdf", "base").await.unwrap();
        let revision = repo
            .create_revision(&document.id, "<p>edited</p>")
            .await
            .unwrap();

        let loaded = repo.get_revision(&revision.id).await.unwrap().unwrap();
        assert_eq!(loaded.document_id, document.id);
        assert_eq!(loaded.content, "<p>edited</p>");
    }

    #[tokio::test]
    async fn test_create_revision_unknown_document() {
        let pool = setup_test_db().await;
        let repo = DocumentRepository::new(&pool);

        let err = repo.create_revision("missing", "x").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM revisions")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_list_orders_documents_newest_first() {
        let pool = setup_test_db().await;
        let repo = DocumentRepository::new(&pool);

        seed_document(&pool, "d1", "old.pdf", "2024-01-01T00:00:00+00:00").await;
        seed_document(&pool, "d2", "new.pdf", "2024-06-01T00:00:00+00:00").await;
        seed_document(&pool, "d3", "mid.pdf", "2024-03-01T00:00:00+00:00").await;

        let documents = repo.list_documents().await.unwrap();
        let names: Vec<&str> = documents.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["new.pdf", "mid.pdf", "old.pdf"]);
    }

    #[tokio::test]
    async fn test_list_orders_revisions_oldest_first() {
        let pool = setup_test_db().await;
        let repo = DocumentRepository::new(&pool);

        seed_document(&pool, "d1", "a.pdf", "2024-01-01T00:00:00+00:00").await;
        // Inserted out of chronological order on purpose
        seed_revision(&pool, "r2", "d1", "2024-01-03T00:00:00+00:00").await;
        seed_revision(&pool, "r1", "d1", "2024-01-02T00:00:00+00:00").await;
        seed_revision(&pool, "r3", "d1", "2024-01-04T00:00:00+00:00").await;

        let documents = repo.list_documents().await.unwrap();
        let ids: Vec<&str> = documents[0].revisions.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["r1", "r2", "r3"]);
    }

    #[tokio::test]
    async fn test_revision_order_ties_break_by_id() {
        let pool = setup_test_db().await;
        let repo = DocumentRepository::new(&pool);

        seed_document(&pool, "d1", "a.pdf", "2024-01-01T00:00:00+00:00").await;
        seed_revision(&pool, "rb", "d1", "2024-01-02T00:00:00+00:00").await;
        seed_revision(&pool, "ra", "d1", "2024-01-02T00:00:00+00:00").await;

        let documents = repo.list_documents().await.unwrap();
        let ids: Vec<&str> = documents[0].revisions.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["ra", "rb"]);
    }

    #[tokio::test]
    async fn test_latest_revision() {
        let pool = setup_test_db().await;
        let repo = DocumentRepository::new(&pool);

        seed_document(&pool, "d1", "a.pdf", "2024-01-01T00:00:00+00:00").await;
        assert!(repo.latest_revision("d1").await.unwrap().is_none());

        seed_revision(&pool, "r1", "d1", "2024-01-02T00:00:00+00:00").await;
        seed_revision(&pool, "r2", "d1", "2024-01-05T00:00:00+00:00").await;
        seed_revision(&pool, "r3", "d1", "2024-01-03T00:00:00+00:00").await;

        let latest = repo.latest_revision("d1").await.unwrap().unwrap();
        assert_eq!(latest.id, "r2");
    }
}
