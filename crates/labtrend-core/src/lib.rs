//! Extraction and merge core for labtrend.
//!
//! - [`extract`]: the line-shape decision list turning rows into observations
//! - [`merge`]: folding observations into a [`TestHistory`](labtrend_model::TestHistory)
//! - [`pipeline`]: normalize, tokenize and extract one document

pub mod extract;
pub mod merge;
pub mod pipeline;

pub use extract::{
    DecimalConvention, DocumentExtraction, ExtractOptions, Extractor, GroupOutcome, LineShape,
    ShapeContext, ShapeMatch, Specificity, default_extractor,
};
pub use merge::{MergeReport, collapse_duplicates, merge_observations};
pub use pipeline::{DocumentOutcome, PipelineOptions, merge_document, process_document};
