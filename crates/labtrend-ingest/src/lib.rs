//! Report ingestion for labtrend.
//!
//! - [`discovery`]: finding and reading rendered report files
//! - [`normalize`]: raw bytes to canonical line-oriented text
//! - [`tokenize`]: canonical text to a report date and candidate rows

pub mod discovery;
pub mod error;
pub mod normalize;
pub mod tokenize;

pub use discovery::{REPORT_EXTENSIONS, list_report_files, read_report, source_name};
pub use error::{IngestError, Result};
pub use normalize::{NormalizeOptions, NormalizeWarning, NormalizedText, normalize};
pub use tokenize::{LineGroups, ReportDate, TokenizeOptions, tokenize, tokenize_document};
