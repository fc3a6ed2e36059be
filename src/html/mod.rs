//! Content formatting between storage and display representations

mod formatter;

pub use formatter::*;
