//! Per-document fatal errors.
//!
//! These abort processing of one document only; a batch keeps going.

use thiserror::Error;

/// The input bytes could not be turned into text.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodingError {
    /// No bytes, or only whitespace after decoding.
    #[error("document is empty")]
    Empty,

    /// Too many NUL/control bytes for a rendered text document.
    #[error("document looks binary ({control_bytes} of {total_bytes} bytes are control bytes)")]
    Binary {
        control_bytes: usize,
        total_bytes: usize,
    },

    /// The configured fallback encoding label is not known.
    #[error("unknown encoding label '{label}'")]
    UnknownEncoding { label: String },
}

/// Errors that reject a whole document.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("could not decode document: {0}")]
    Decoding(#[from] DecodingError),

    /// No report date pattern matched near the header.
    #[error("no report date found in the first {searched_lines} lines")]
    MissingDate { searched_lines: usize },
}

/// Result type for per-document operations.
pub type Result<T> = std::result::Result<T, DocumentError>;
