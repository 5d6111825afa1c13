//! Per-document pipeline with explicit stages.
//!
//! 1. **Normalize**: raw bytes to canonical text
//! 2. **Tokenize**: report date and candidate line groups
//! 3. **Extract**: line groups to observations
//! 4. **Merge**: observations into the caller's history
//!
//! Stages 1-3 are pure and fail only with a [`DocumentError`] for the one
//! document. Stage 4 is kept separate so the caller controls the single
//! mutable history.

use std::time::Instant;

use chrono::NaiveDate;
use labtrend_ingest::{
    NormalizeOptions, NormalizeWarning, TokenizeOptions, normalize, tokenize_document,
};
use labtrend_model::{Diagnostic, DocumentError, Observation, TestHistory};
use tracing::{debug, info, info_span};

use crate::extract::{ExtractOptions, Extractor};
use crate::merge::{MergeReport, merge_observations};

/// Options for all extraction stages.
#[derive(Debug, Clone, Copy, Default)]
pub struct PipelineOptions {
    pub normalize: NormalizeOptions,
    pub tokenize: TokenizeOptions,
    pub extract: ExtractOptions,
}

impl PipelineOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_normalize(mut self, normalize: NormalizeOptions) -> Self {
        self.normalize = normalize;
        self
    }

    pub fn with_tokenize(mut self, tokenize: TokenizeOptions) -> Self {
        self.tokenize = tokenize;
        self
    }

    pub fn with_extract(mut self, extract: ExtractOptions) -> Self {
        self.extract = extract;
        self
    }
}

/// Result of stages 1-3 for one document.
#[derive(Debug, Clone)]
pub struct DocumentOutcome {
    pub source: String,
    pub report_date: NaiveDate,
    /// Encoding the document was decoded with.
    pub encoding: &'static str,
    pub confidence: f32,
    pub observations: Vec<Observation>,
    /// Encoding fallbacks, skipped lines and repeated results.
    pub diagnostics: Vec<Diagnostic>,
    /// Candidate groups that produced no observation.
    pub skipped: usize,
}

/// Normalizes, tokenizes and extracts one document.
pub fn process_document(
    bytes: &[u8],
    source: &str,
    extractor: &Extractor,
    options: &PipelineOptions,
) -> Result<DocumentOutcome, DocumentError> {
    let span = info_span!("document", source = %source);
    let _guard = span.enter();
    let start = Instant::now();

    let normalized = normalize(bytes, &options.normalize)?;
    let mut diagnostics: Vec<Diagnostic> = normalized
        .warnings
        .iter()
        .map(|warning| match warning {
            NormalizeWarning::EncodingFallback {
                detected,
                confidence,
                fallback,
            } => Diagnostic::EncodingFallback {
                source: source.to_string(),
                detected: (*detected).to_string(),
                confidence: *confidence,
                fallback: (*fallback).to_string(),
            },
        })
        .collect();

    let document = tokenize_document(&normalized.text, source, &options.tokenize)?;
    debug!(
        date = %document.report_date,
        groups = document.groups.len(),
        markup = normalized.from_markup,
        "tokenized"
    );

    let extraction = extractor.extract_document(&document, &options.extract);
    diagnostics.extend(extraction.diagnostics);

    info!(
        date = %document.report_date,
        encoding = normalized.encoding,
        observations = extraction.observations.len(),
        skipped = extraction.skipped,
        duration_ms = start.elapsed().as_millis(),
        "document extracted"
    );

    Ok(DocumentOutcome {
        source: document.source,
        report_date: document.report_date,
        encoding: normalized.encoding,
        confidence: normalized.confidence,
        observations: extraction.observations,
        diagnostics,
        skipped: extraction.skipped,
    })
}

/// Merges a processed document into `history`.
pub fn merge_document(history: &mut TestHistory, outcome: &DocumentOutcome) -> MergeReport {
    let _guard = info_span!("merge", source = %outcome.source).entered();
    merge_observations(history, &outcome.observations, &outcome.source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::default_extractor;
    use labtrend_model::DecodingError;

    #[test]
    fn missing_date_rejects_document() {
        let bytes = "Glukoz\t95\tmg/dL\t70-100\n".as_bytes();
        let err = process_document(bytes, "a.txt", default_extractor(), &PipelineOptions::new())
            .unwrap_err();
        assert!(matches!(err, DocumentError::MissingDate { searched_lines: 40 }));
    }

    #[test]
    fn empty_input_is_a_decoding_error() {
        let err = process_document(b"", "a.txt", default_extractor(), &PipelineOptions::new())
            .unwrap_err();
        assert!(matches!(err, DocumentError::Decoding(DecodingError::Empty)));
    }

    #[test]
    fn extracts_and_merges() {
        let text = "Rapor Tarihi: 10.05.2023\nGlukoz  95  mg/dL  70-100\n";
        let outcome =
            process_document(text.as_bytes(), "a.txt", default_extractor(), &PipelineOptions::new())
                .unwrap();
        assert_eq!(outcome.encoding, "UTF-8");
        assert_eq!(outcome.observations.len(), 1);
        assert!(outcome.diagnostics.is_empty());

        let mut history = TestHistory::new();
        let report = merge_document(&mut history, &outcome);
        assert_eq!(report.inserted, 1);
        assert_eq!(merge_document(&mut history, &outcome).unchanged, 1);
    }
}
