//! Data model for laboratory result histories.
//!
//! - [`observation`]: typed results ([`Observation`], [`ReferenceRange`], [`Flag`])
//! - [`history`]: per-test chronological histories and the persisted store
//! - [`document`]: tokenized report documents handed to the extractor
//! - [`diagnostic`]: non-fatal findings surfaced at the end of a run
//! - [`error`]: per-document fatal errors

pub mod diagnostic;
pub mod document;
pub mod error;
pub mod history;
pub mod observation;

pub use diagnostic::{
    Diagnostic, DiagnosticLog, InvalidReason, Severity, SkipReason, UnsupportedShape,
};
pub use document::{LineGroup, ReportDocument};
pub use error::{DecodingError, DocumentError, Result};
pub use history::{
    AccumulatedStore, DEFAULT_PATIENT, EntryValue, HistoryEntry, StoreScope, TestHistory, Upsert,
};
pub use observation::{Flag, Observation, ObservationValue, ReferenceRange, TestName};
