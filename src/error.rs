//! Error types for the reflow library.

use std::io;
use thiserror::Error;

/// Result type alias for reflow operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while reading geometry or rendering output.
///
/// Layout fallbacks (ambiguous columns, missing captions, skipped splits) are
/// never errors; they are counted in [`crate::layout::Diagnostics`].
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The geometry JSON could not be decoded.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The input is structurally invalid (e.g. a page without a size).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A fragment or item has a zero, negative or non-finite box.
    /// Only returned in strict mode.
    #[error("Degenerate geometry on page {page}: {what}")]
    DegenerateGeometry {
        /// Page number
        page: u32,
        /// Description of the offending element
        what: String,
    },

    /// Page number is out of range.
    #[error("Page {0} is out of range (document has {1} pages)")]
    PageOutOfRange(u32, u32),

    /// Invalid page range specification.
    #[error("Invalid page range: {0}")]
    InvalidPageRange(String),

    /// Error during rendering (text, JSON).
    #[error("Rendering error: {0}")]
    Render(String),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}
