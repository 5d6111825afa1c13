//! CLI library components for labtrend.

pub mod batch;
pub mod logging;
pub mod types;

pub use batch::{BatchConfig, run_batch};
pub use types::{DocumentStatus, DocumentSummary, RunResult};
