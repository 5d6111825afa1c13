use std::path::PathBuf;

use chrono::NaiveDate;
use labtrend_core::MergeReport;
use labtrend_model::{DiagnosticLog, Severity};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentStatus {
    /// New or superseded entries were merged.
    Merged,
    /// Every extracted result was already in the store.
    Unchanged,
    /// The document could not be read, decoded or dated.
    Rejected { reason: String },
}

impl DocumentStatus {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Merged => "merged",
            Self::Unchanged => "unchanged",
            Self::Rejected { .. } => "rejected",
        }
    }
}

#[derive(Debug, Clone)]
pub struct DocumentSummary {
    pub source: String,
    pub report_date: Option<NaiveDate>,
    pub encoding: Option<&'static str>,
    pub extracted: usize,
    pub skipped: usize,
    /// Merge counts; notices are moved into the run's diagnostics.
    pub merge: MergeReport,
    pub status: DocumentStatus,
}

impl DocumentSummary {
    pub fn rejected(source: &str, reason: String) -> Self {
        Self {
            source: source.to_string(),
            report_date: None,
            encoding: None,
            extracted: 0,
            skipped: 0,
            merge: MergeReport::default(),
            status: DocumentStatus::Rejected { reason },
        }
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self.status, DocumentStatus::Rejected { .. })
    }
}

#[derive(Debug)]
pub struct RunResult {
    pub input_dir: PathBuf,
    pub store_path: PathBuf,
    pub documents: Vec<DocumentSummary>,
    pub diagnostics: DiagnosticLog,
    pub dry_run: bool,
    pub store_written: bool,
    /// Observations held by the store after the run.
    pub stored_observations: usize,
}

impl RunResult {
    pub fn rejected_count(&self) -> usize {
        self.documents
            .iter()
            .filter(|document| document.is_rejected())
            .count()
    }

    pub fn has_rejections(&self) -> bool {
        self.rejected_count() > 0
    }

    pub fn warning_count(&self) -> usize {
        self.diagnostics.count(Severity::Warning)
    }

    /// Sum of all per-document merge counts.
    pub fn totals(&self) -> MergeReport {
        let mut totals = MergeReport::default();
        for document in &self.documents {
            totals.absorb(document.merge.clone());
        }
        totals
    }
}
