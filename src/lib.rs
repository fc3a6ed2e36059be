//! Palimpsest Server Library
//!
//! A small document-management server: PDF uploads are ingested into
//! plain-text documents, and edits are saved as immutable, append-only
//! revisions.
//!
//! # Modules
//!
//! - `pdf`: PDF text extraction with page-break markers
//! - `html`: storage/display content formatting
//! - `db`: SQLite persistence for documents and revisions
//! - `service`: ingestion, content resolution and revision saves
//! - `session`: editing state, find-next / replace-all, save signals
//! - `routes`: the HTTP surface

pub mod config;
pub mod db;
pub mod error;
pub mod html;
pub mod pdf;
pub mod routes;
pub mod service;
pub mod session;
pub mod state;
pub mod storage;

use axum::{routing::get, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use state::AppState;

/// Build the application router over a prepared state
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(routes::health::health_check))
        .nest("/api/v1/documents", routes::documents::router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
