//! Transforms between stored plain text and the editor's markup
//!
//! Stored text carries raw newlines and page-break markers from extraction.
//! Display markup carries `<br>` tags and no markers. The two directions are
//! deliberately not a byte-for-byte round trip: markers are dropped on the
//! way out and never come back.

use std::cell::RefCell;
use std::rc::Rc;

use lol_html::{doc_text, element, rewrite_str, RewriteStrSettings};

use crate::pdf::is_page_break_marker;

/// Convert stored plain text into a display-ready markup fragment
///
/// Page-break marker lines are dropped, remaining newlines become `<br>`.
/// Idempotent: markup produced by this function passes through unchanged.
pub fn to_display(stored: &str) -> String {
    let kept: Vec<&str> = stored
        .lines()
        .filter(|line| !is_page_break_marker(line.trim_end_matches('\r')))
        .collect();

    kept.join("<br>")
}

/// Convert editor markup into its stored form
///
/// The editor authors markup directly, so this is a passthrough. It exists as
/// a named seam so the storage representation can diverge later without
/// touching callers.
pub fn to_storage(markup: &str) -> String {
    markup.to_string()
}

/// Flatten markup into the plain-text view the editor exposes for searching
///
/// Parsed with `lol_html`, so quoted attributes, comments and malformed tags
/// never leak into the text. `<br>` and block element boundaries become
/// newlines, and HTML entities are decoded.
pub fn markup_to_text(markup: &str) -> String {
    let out = Rc::new(RefCell::new(String::new()));

    let text_out = Rc::clone(&out);
    let br_out = Rc::clone(&out);

    let mut element_handlers = vec![element!("br", move |_el| {
        br_out.borrow_mut().push('\n');
        Ok(())
    })];

    // A new block element starts a new line unless one just started
    for tag in [
        "p", "div", "li", "blockquote", "h1", "h2", "h3", "h4", "h5", "h6",
    ] {
        let block_out = Rc::clone(&out);
        element_handlers.push(element!(tag, move |_el| {
            let mut out = block_out.borrow_mut();
            if !out.is_empty() && !out.ends_with('\n') {
                out.push('\n');
            }
            Ok(())
        }));
    }

    let result = rewrite_str(
        markup,
        RewriteStrSettings {
            document_content_handlers: vec![doc_text!(move |chunk| {
                text_out.borrow_mut().push_str(chunk.as_str());
                Ok(())
            })],
            element_content_handlers: element_handlers,
            ..RewriteStrSettings::default()
        },
    );

    if let Err(e) = result {
        // Handlers never fail and the tokenizer recovers from malformed
        // input, so this only fires on rewriter limits; serve what was
        // collected up to that point
        tracing::warn!("Markup flattening stopped early: {}", e);
    }

    let text = out.borrow();
    let text = text.trim_end_matches('\n');

    html_escape::decode_html_entities(text).into_owned()
}
