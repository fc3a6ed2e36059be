//! Document API endpoints
//!
//! REST surface over the document service:
//! - Ingest an uploaded PDF blob into a new document
//! - Append revisions
//! - Resolve display content for a document or a pinned revision
//! - List documents with their revision histories

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::db::Document;
use crate::error::{AppError, Result};
use crate::service::ContentSelector;
use crate::state::AppState;

/// Request body for document creation
#[derive(Debug, Deserialize)]
pub struct CreateDocumentRequest {
    /// Display name, usually the uploaded file name
    pub name: String,
    /// URL of the already-uploaded blob
    pub url: String,
}

/// Request body for revision creation
#[derive(Debug, Deserialize)]
pub struct CreateRevisionRequest {
    pub content: String,
}

/// Response for revision creation
#[derive(Serialize)]
pub struct CreateRevisionResponse {
    pub id: String,
}

/// Query parameters for content resolution
#[derive(Debug, Deserialize)]
pub struct ContentQuery {
    pub id: Option<String>,
    #[serde(rename = "revisionId")]
    pub revision_id: Option<String>,
}

/// Response for content resolution
#[derive(Serialize)]
pub struct ContentResponse {
    pub content: String,
}

/// Query parameters for listing
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// Cache-bust token sent by listing clients; accepted and ignored
    #[allow(dead_code)]
    pub refresh: Option<String>,
}

/// Response for document listing
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentListResponse {
    pub documents: Vec<Document>,
    pub total: usize,
}

/// Create the documents router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_documents).post(create_document))
        .route("/content", get(resolve_content))
        .route("/:id/revisions", post(create_revision))
}

/// Ingest an uploaded PDF blob and create its document
async fn create_document(
    State(state): State<AppState>,
    Json(request): Json<CreateDocumentRequest>,
) -> Result<(StatusCode, Json<Document>)> {
    if request.name.is_empty() {
        return Err(AppError::BadRequest("name must not be empty".to_string()));
    }
    if request.url.is_empty() {
        return Err(AppError::BadRequest("url must not be empty".to_string()));
    }

    let document = state.service().ingest(&request.name, &request.url).await?;

    Ok((StatusCode::CREATED, Json(document)))
}

/// Append a revision to a document
async fn create_revision(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<CreateRevisionRequest>,
) -> Result<(StatusCode, Json<CreateRevisionResponse>)> {
    let revision = state.service().save(&id, &request.content).await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateRevisionResponse { id: revision.id }),
    ))
}

/// Resolve display markup for a document or a pinned revision
async fn resolve_content(
    State(state): State<AppState>,
    Query(query): Query<ContentQuery>,
) -> Result<Json<ContentResponse>> {
    let selector = ContentSelector::from_params(query.id, query.revision_id);
    let content = state.service().resolve_content(&selector).await?;

    Ok(Json(ContentResponse { content }))
}

/// List all documents, newest first, with their revision histories
async fn list_documents(
    State(state): State<AppState>,
    Query(_query): Query<ListQuery>,
) -> Result<Json<DocumentListResponse>> {
    let documents = state.service().list().await?;
    let total = documents.len();

    Ok(Json(DocumentListResponse { documents, total }))
}
