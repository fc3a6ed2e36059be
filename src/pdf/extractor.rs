//! PDF text extraction via [`pdf_extract`]
//!
//! `pdf_extract` can panic on malformed input rather than returning errors,
//! so all calls are wrapped in [`std::panic::catch_unwind`] and panics are
//! converted into [`ExtractError`].

use std::panic::{self, AssertUnwindSafe};

use thiserror::Error;

const PAGE_BREAK_PREFIX: &str = "----------------Page (";
const PAGE_BREAK_SUFFIX: &str = ") Break----------------";

/// Errors produced while extracting text from a PDF
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    #[error("PDF extraction panicked (malformed document)")]
    Panicked,

    #[error("PDF contained no pages")]
    Empty,
}

/// Extract the full text of a PDF, one page after another, with an explicit
/// page-break marker line after each page.
///
/// Line breaks within a page are preserved. The marker is a storage artifact;
/// the display formatter strips it before content reaches the user.
pub fn extract_text(bytes: &[u8]) -> Result<String, ExtractError> {
    let pages = extract_pages(bytes)?;
    if pages.is_empty() {
        return Err(ExtractError::Empty);
    }

    Ok(join_pages(&pages))
}

/// Extract one `String` per page, catching panics from the underlying library
fn extract_pages(bytes: &[u8]) -> Result<Vec<String>, ExtractError> {
    let data = bytes.to_vec(); // owned copy for the unwind boundary
    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        pdf_extract::extract_text_from_mem_by_pages(&data)
    }));

    match result {
        Ok(Ok(pages)) => Ok(pages),
        Ok(Err(e)) => Err(ExtractError::Parse(e.to_string())),
        Err(_) => Err(ExtractError::Panicked),
    }
}

/// Join extracted pages, inserting `----------------Page (N) Break----------------`
/// on its own line after page N.
pub fn join_pages(pages: &[String]) -> String {
    let mut out = String::new();
    for (i, page) in pages.iter().enumerate() {
        out.push_str(page);
        if !page.ends_with('\n') {
            out.push('\n');
        }
        out.push_str(&page_break_marker(i + 1));
        out.push('\n');
    }
    out
}

/// Render the marker line for page `n`
pub fn page_break_marker(n: usize) -> String {
    format!("{}{}{}", PAGE_BREAK_PREFIX, n, PAGE_BREAK_SUFFIX)
}

/// True when `line` is exactly a page-break marker
///
/// A structural check rather than a pattern engine, so document text that
/// merely resembles a marker prefix is never misclassified.
pub fn is_page_break_marker(line: &str) -> bool {
    let Some(rest) = line.strip_prefix(PAGE_BREAK_PREFIX) else {
        return false;
    };
    let Some(digits) = rest.strip_suffix(PAGE_BREAK_SUFFIX) else {
        return false;
    };
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_pages_inserts_markers() {
        let pages = vec!["first page".to_string(), "second page\n".to_string()];
        let text = join_pages(&pages);

        assert_eq!(
            text,
            "first page\n----------------Page (1) Break----------------\n\
             second page\n----------------Page (2) Break----------------\n"
        );
    }

    #[test]
    fn test_join_pages_deterministic() {
        let pages = vec!["alpha\nbeta".to_string()];
        assert_eq!(join_pages(&pages), join_pages(&pages));
    }

    #[test]
    fn test_marker_detection() {
        assert!(is_page_break_marker(&page_break_marker(1)));
        assert!(is_page_break_marker(&page_break_marker(42)));
        assert!(!is_page_break_marker("----------------Page () Break----------------"));
        assert!(!is_page_break_marker("----------------Page (x) Break----------------"));
        assert!(!is_page_break_marker("some ordinary line"));
        assert!(!is_page_break_marker(""));
    }

    #[test]
    fn test_extract_rejects_garbage() {
        let err = extract_text(b"definitely not a pdf").unwrap_err();
        assert!(matches!(
            err,
            ExtractError::Parse(_) | ExtractError::Panicked | ExtractError::Empty
        ));
    }
}
