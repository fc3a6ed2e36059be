//! PDF text extraction
//!
//! Leaf module: turns raw PDF bytes into plain text with page-break markers.
//! Knows nothing about documents or revisions.

mod extractor;

pub use extractor::*;
