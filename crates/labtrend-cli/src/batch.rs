//! Batch run: discover, extract, merge and persist.
//!
//! Documents are processed one at a time in file-name order against a single
//! mutable history. A document that cannot be read, decoded or dated is
//! recorded as rejected and the run moves on; only failures to scan the input
//! directory or to load or save the store abort the run.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use labtrend_core::{PipelineOptions, default_extractor, merge_document, process_document};
use labtrend_ingest::{list_report_files, read_report, source_name};
use labtrend_model::{Diagnostic, DiagnosticLog, StoreScope, TestHistory};
use labtrend_store::{load_store, save_store};
use tracing::{debug, info, info_span, warn};

use crate::logging::redact_value;
use crate::types::{DocumentStatus, DocumentSummary, RunResult};

/// Inputs of one batch run.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    pub input_dir: PathBuf,
    pub store_path: PathBuf,
    /// Patient identifier; when set the store is keyed per patient.
    pub patient: Option<String>,
    pub options: PipelineOptions,
    /// Extract and report without writing the store.
    pub dry_run: bool,
}

impl BatchConfig {
    /// Config with the default store location `<input_dir>/data.json`.
    pub fn new(input_dir: impl Into<PathBuf>) -> Self {
        let input_dir = input_dir.into();
        Self {
            store_path: input_dir.join("data.json"),
            input_dir,
            patient: None,
            options: PipelineOptions::default(),
            dry_run: false,
        }
    }

    pub fn with_store_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.store_path = path.into();
        self
    }

    pub fn with_patient(mut self, patient: Option<String>) -> Self {
        self.patient = patient;
        self
    }

    pub fn with_options(mut self, options: PipelineOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn scope(&self) -> StoreScope {
        if self.patient.is_some() {
            StoreScope::PerPatient
        } else {
            StoreScope::Single
        }
    }
}

pub fn run_batch(config: &BatchConfig) -> Result<RunResult> {
    let run_span = info_span!("run", input_dir = %config.input_dir.display());
    let _run_guard = run_span.enter();
    let start = Instant::now();

    let files = list_report_files(&config.input_dir)
        .with_context(|| format!("scan {}", config.input_dir.display()))?;
    let mut store = load_store(&config.store_path, config.scope())
        .with_context(|| format!("load store {}", config.store_path.display()))?;
    info!(documents = files.len(), "discovered reports");

    let mut diagnostics = DiagnosticLog::new();
    let mut documents = Vec::with_capacity(files.len());
    for path in &files {
        let source = source_name(path);
        let history = store.history_mut(config.patient.as_deref());
        let summary = match read_report(path) {
            Ok(bytes) => process_one(&bytes, &source, history, &config.options, &mut diagnostics),
            Err(error) => reject(&source, &error, &mut diagnostics),
        };
        documents.push(summary);
    }

    let changed = documents.iter().any(|document| document.merge.changed());
    let store_written = if config.dry_run {
        info!("dry run, store not written");
        false
    } else if changed || !config.store_path.exists() {
        save_store(&store, &config.store_path)
            .with_context(|| format!("save store {}", config.store_path.display()))?;
        true
    } else {
        info!(path = %config.store_path.display(), "store unchanged");
        false
    };

    let result = RunResult {
        input_dir: config.input_dir.clone(),
        store_path: config.store_path.clone(),
        documents,
        diagnostics,
        dry_run: config.dry_run,
        store_written,
        stored_observations: store.observation_count(),
    };
    info!(
        documents = result.documents.len(),
        rejected = result.rejected_count(),
        warnings = result.warning_count(),
        duration_ms = start.elapsed().as_millis(),
        "run complete"
    );
    Ok(result)
}

fn process_one(
    bytes: &[u8],
    source: &str,
    history: &mut TestHistory,
    options: &PipelineOptions,
    diagnostics: &mut DiagnosticLog,
) -> DocumentSummary {
    let outcome = match process_document(bytes, source, default_extractor(), options) {
        Ok(outcome) => outcome,
        Err(error) => return reject(source, &error, diagnostics),
    };

    for diagnostic in &outcome.diagnostics {
        if let Diagnostic::UnparsableLine { line, text, .. } = diagnostic {
            debug!(source, line, text = redact_value(text), "skipped line text");
        }
    }

    let mut merge = merge_document(history, &outcome);
    let status = if merge.changed() {
        DocumentStatus::Merged
    } else {
        DocumentStatus::Unchanged
    };
    diagnostics.extend(outcome.diagnostics);
    diagnostics.extend(std::mem::take(&mut merge.notices));

    DocumentSummary {
        source: outcome.source,
        report_date: Some(outcome.report_date),
        encoding: Some(outcome.encoding),
        extracted: outcome.observations.len(),
        skipped: outcome.skipped,
        merge,
        status,
    }
}

fn reject(
    source: &str,
    error: &dyn std::error::Error,
    diagnostics: &mut DiagnosticLog,
) -> DocumentSummary {
    let reason = error.to_string();
    warn!(source, reason = %reason, "document rejected");
    diagnostics.push(Diagnostic::DocumentRejected {
        source: source.to_string(),
        reason: reason.clone(),
    });
    DocumentSummary::rejected(source, reason)
}
