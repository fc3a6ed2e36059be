//! Editing session
//!
//! Holds the client-side editing state: the selected content target, the
//! in-memory markup and the find-next cursor. Selection and refresh signals
//! are explicit here rather than ambient globals; interested components
//! subscribe to the session's event channel.

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::db::Revision;
use crate::error::{AppError, Result};
use crate::html;
use crate::service::{ContentSelector, DocumentService};

/// Notifications emitted by a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// New content was loaded into the editor
    ContentLoaded { selector: ContentSelector },
    /// A revision was persisted; listings should refresh
    RevisionSaved {
        document_id: String,
        revision_id: String,
    },
}

/// Outcome of a find-next call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// Match span as byte offsets into the plain-text view, for selection
    Found { start: usize, end: usize },
    /// No further occurrences; the cursor was reset to the start
    NoMoreOccurrences,
}

/// One user's editing state against the document service
pub struct EditingSession {
    service: DocumentService,
    selector: ContentSelector,
    /// Document the session saves into; kept when drilling into a revision
    document_id: Option<String>,
    markup: String,
    search_idx: usize,
    events: UnboundedSender<SessionEvent>,
    receiver: Option<UnboundedReceiver<SessionEvent>>,
}

impl EditingSession {
    pub fn new(service: DocumentService) -> Self {
        let (events, receiver) = mpsc::unbounded_channel();
        Self {
            service,
            selector: ContentSelector::None,
            document_id: None,
            markup: String::new(),
            search_idx: 0,
            events,
            receiver: Some(receiver),
        }
    }

    /// Take the event stream; yields `None` after the first call
    pub fn take_events(&mut self) -> Option<UnboundedReceiver<SessionEvent>> {
        self.receiver.take()
    }

    /// The markup currently held in the editor
    pub fn markup(&self) -> &str {
        &self.markup
    }

    /// Overwrite the editor content (the editing surface calls this as the
    /// user types)
    pub fn set_markup(&mut self, markup: impl Into<String>) {
        self.markup = markup.into();
    }

    /// Load content for a selector into the editor
    ///
    /// Selecting a revision keeps the previously selected document as the
    /// save target, mirroring revision drill-down within a document.
    pub async fn load(&mut self, selector: ContentSelector) -> Result<()> {
        let markup = self.service.resolve_content(&selector).await?;

        if let ContentSelector::Document(id) = &selector {
            self.document_id = Some(id.clone());
        }
        self.selector = selector.clone();
        self.markup = markup;
        self.search_idx = 0;

        let _ = self.events.send(SessionEvent::ContentLoaded { selector });
        Ok(())
    }

    /// Find the next literal, case-sensitive occurrence of `query` in the
    /// plain-text view of the editor content
    ///
    /// The cursor advances one character past each match start so repeated
    /// calls walk forward through the text. A miss resets the cursor.
    pub fn find_next(&mut self, query: &str) -> SearchOutcome {
        let text = html::markup_to_text(&self.markup);

        if query.is_empty() {
            self.search_idx = 0;
            return SearchOutcome::NoMoreOccurrences;
        }

        // The cursor may be stale after content edits; clamp it to a char
        // boundary inside the current text
        let mut from = self.search_idx.min(text.len());
        while !text.is_char_boundary(from) {
            from -= 1;
        }

        match text[from..].find(query) {
            Some(offset) => {
                let start = from + offset;
                let end = start + query.len();
                let step = text[start..]
                    .chars()
                    .next()
                    .map(char::len_utf8)
                    .unwrap_or(1);
                self.search_idx = start + step;
                SearchOutcome::Found { start, end }
            }
            None => {
                self.search_idx = 0;
                SearchOutcome::NoMoreOccurrences
            }
        }
    }

    /// Replace every literal occurrence of `query` in the markup view and
    /// return the number of replacements
    ///
    /// Only the in-memory content changes; persistence happens via `save`.
    pub fn replace_all(&mut self, query: &str, replacement: &str) -> usize {
        if query.is_empty() {
            return 0;
        }

        let count = self.markup.matches(query).count();
        if count > 0 {
            self.markup = self.markup.replace(query, replacement);
        }
        count
    }

    /// Persist the current markup as a new revision of the selected document
    pub async fn save(&mut self) -> Result<Revision> {
        let document_id = self
            .document_id
            .clone()
            .ok_or(AppError::NoSelection)?;

        let revision = self.service.save(&document_id, &self.markup).await?;

        let _ = self.events.send(SessionEvent::RevisionSaved {
            document_id,
            revision_id: revision.id.clone(),
        });

        Ok(revision)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{initialize_schema, DocumentRepository};
    use crate::storage::BlobFetcher;
    use async_trait::async_trait;
    use sqlx::SqlitePool;
    use std::sync::Arc;

    struct NoBlobs;

    #[async_trait]
    impl BlobFetcher for NoBlobs {
        async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
            Err(AppError::BlobFetch(format!("no blob at {}", url)))
        }
    }

    async fn setup_session() -> (EditingSession, SqlitePool) {
        let pool = SqlitePool::connect(":memory:").await.unwrap();
        initialize_schema(&pool).await.unwrap();
        let service = DocumentService::new(pool.clone(), Arc::new(NoBlobs));
        (EditingSession::new(service), pool)
    }

    #[tokio::test]
    async fn test_find_next_walks_forward_then_resets() {
        let (mut session, _pool) = setup_session().await;
        session.set_markup("xfooxfoo");

        assert_eq!(session.find_next("foo"), SearchOutcome::Found { start: 1, end: 4 });
        assert_eq!(session.find_next("foo"), SearchOutcome::Found { start: 5, end: 8 });
        assert_eq!(session.find_next("foo"), SearchOutcome::NoMoreOccurrences);

        // The reset cursor finds the first occurrence again
        assert_eq!(session.find_next("foo"), SearchOutcome::Found { start: 1, end: 4 });
    }

    #[tokio::test]
    async fn test_find_next_searches_plain_text_view() {
        let (mut session, _pool) = setup_session().await;
        session.set_markup("<p>alpha</p><p>beta</p>");

        // "alpha\nbeta": tags never match, block boundaries do
        assert_eq!(
            session.find_next("beta"),
            SearchOutcome::Found { start: 6, end: 10 }
        );
        assert_eq!(session.find_next("<p>"), SearchOutcome::NoMoreOccurrences);
    }

    #[tokio::test]
    async fn test_find_next_is_literal_not_pattern() {
        let (mut session, _pool) = setup_session().await;
        session.set_markup("abc a.c");

        // "a.c" only matches itself, not "abc"
        assert_eq!(session.find_next("a.c"), SearchOutcome::Found { start: 4, end: 7 });
    }

    #[tokio::test]
    async fn test_find_next_empty_query() {
        let (mut session, _pool) = setup_session().await;
        session.set_markup("anything");

        assert_eq!(session.find_next(""), SearchOutcome::NoMoreOccurrences);
    }

    #[tokio::test]
    async fn test_find_next_multibyte_content() {
        let (mut session, _pool) = setup_session().await;
        session.set_markup("héllo héllo");

        assert!(matches!(session.find_next("héllo"), SearchOutcome::Found { start: 0, .. }));
        assert!(matches!(session.find_next("héllo"), SearchOutcome::Found { start: 7, .. }));
        assert_eq!(session.find_next("héllo"), SearchOutcome::NoMoreOccurrences);
    }

    #[tokio::test]
    async fn test_replace_all_counts_and_replaces() {
        let (mut session, _pool) = setup_session().await;
        session.set_markup("foo and foo");

        let count = session.replace_all("foo", "bar");
        assert_eq!(count, 2);
        assert_eq!(session.markup(), "bar and bar");
    }

    #[tokio::test]
    async fn test_replace_all_is_literal() {
        let (mut session, _pool) = setup_session().await;
        session.set_markup("a.c abc a.c");

        let count = session.replace_all("a.c", "X");
        assert_eq!(count, 2);
        assert_eq!(session.markup(), "X abc X");
    }

    #[tokio::test]
    async fn test_replace_all_operates_on_markup() {
        let (mut session, _pool) = setup_session().await;
        session.set_markup("<b>foo</b>");

        assert_eq!(session.replace_all("<b>", "<i>"), 1);
        assert_eq!(session.markup(), "<i>foo</b>");
    }

    #[tokio::test]
    async fn test_replace_all_empty_query() {
        let (mut session, _pool) = setup_session().await;
        session.set_markup("unchanged");

        assert_eq!(session.replace_all("", "x"), 0);
        assert_eq!(session.markup(), "unchanged");
    }

    #[tokio::test]
    async fn test_load_edit_save_emits_refresh() {
        let (mut session, pool) = setup_session().await;
        let mut events = session.take_events().unwrap();

        let repo = DocumentRepository::new(&pool);
        let document = repo.create_document("a.pdf", "line one\nline two").await.unwrap();

        session
            .load(ContentSelector::Document(document.id.clone()))
            .await
            .unwrap();
        assert_eq!(session.markup(), "line one<br>line two");
        assert_eq!(
            events.recv().await.unwrap(),
            SessionEvent::ContentLoaded {
                selector: ContentSelector::Document(document.id.clone())
            }
        );

        session.replace_all("one", "1");
        let revision = session.save().await.unwrap();

        assert_eq!(
            events.recv().await.unwrap(),
            SessionEvent::RevisionSaved {
                document_id: document.id.clone(),
                revision_id: revision.id.clone(),
            }
        );

        // The saved revision is now what the document resolves to
        session
            .load(ContentSelector::Document(document.id.clone()))
            .await
            .unwrap();
        assert_eq!(session.markup(), "line 1<br>line two");
    }

    #[tokio::test]
    async fn test_save_without_selection() {
        let (mut session, _pool) = setup_session().await;
        session.set_markup("orphan content");

        let err = session.save().await.unwrap_err();
        assert!(matches!(err, AppError::NoSelection));
    }

    #[tokio::test]
    async fn test_revision_selection_keeps_save_target() {
        let (mut session, pool) = setup_session().await;

        let repo = DocumentRepository::new(&pool);
        let document = repo.create_document("a.pdf", "base").await.unwrap();

        session
            .load(ContentSelector::Document(document.id.clone()))
            .await
            .unwrap();
        let first = session.save().await.unwrap();

        // Drill into the historical revision, edit, save again
        session
            .load(ContentSelector::Revision(first.id.clone()))
            .await
            .unwrap();
        session.set_markup("restored and edited");
        let second = session.save().await.unwrap();

        assert_eq!(second.document_id, document.id);
    }
}
