//! Persisted history store for labtrend.
//!
//! The store is a single UTF-8 JSON record whose top-level keys are test
//! names, each mapping to its results in ascending date order. Loading,
//! merging and persisting are separate steps: the caller loads an
//! [`AccumulatedStore`](labtrend_model::AccumulatedStore), merges into it and
//! hands it back to [`save_store`].
//!
//! - `format.rs` - JSON form, single or per-patient
//! - `io/` - load and atomic save
//! - `error.rs` - error types

mod error;
mod format;
mod io;

pub use error::{Result, StoreError};
pub use format::{Decoded, from_json, to_json};
pub use io::{load_store, save_store};
