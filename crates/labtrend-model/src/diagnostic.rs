//! Non-fatal findings accumulated during a run.
//!
//! Nothing the extractor skips or the merger overwrites is dropped silently:
//! each such event becomes a [`Diagnostic`] that the caller can summarize.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::observation::TestName;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Notice,
    Warning,
    Error,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Notice => "notice",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

/// Row layouts that are recognised but cannot be extracted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnsupportedShape {
    /// Current and prior values share one field (e.g. `110 / 95`).
    CombinedCurrentAndPrior,
}

impl fmt::Display for UnsupportedShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CombinedCurrentAndPrior => {
                f.write_str("current and prior value share one field")
            }
        }
    }
}

/// Structural inconsistencies inside a row that otherwise matched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InvalidReason {
    /// Reference range lower bound exceeds the upper bound.
    InvertedRange { low: f64, high: f64 },
    /// Name cell is empty after canonicalization.
    EmptyTestName,
    /// Row timestamp is not a calendar date.
    BadTimestamp { text: String },
    /// Value cell could not be read as a number where one is required.
    UnreadableValue { text: String },
}

impl fmt::Display for InvalidReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvertedRange { low, high } => {
                write!(f, "reference range lower bound {low} exceeds upper bound {high}")
            }
            Self::EmptyTestName => f.write_str("test name is empty"),
            Self::BadTimestamp { text } => write!(f, "row timestamp '{text}' is not a valid date"),
            Self::UnreadableValue { text } => write!(f, "value '{text}' is not a number"),
        }
    }
}

/// Why a candidate line group produced no observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SkipReason {
    Unsupported { shape: UnsupportedShape },
    Invalid { detail: InvalidReason },
    NoShapeMatched,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unsupported { shape } => write!(f, "unsupported layout: {shape}"),
            Self::Invalid { detail } => write!(f, "invalid structure: {detail}"),
            Self::NoShapeMatched => f.write_str("no known result layout matched"),
        }
    }
}

/// A single finding tied to a source document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// Encoding confidence was below threshold; the fallback encoding was used.
    EncodingFallback {
        source: String,
        detected: String,
        confidence: f32,
        fallback: String,
    },
    /// A candidate line was skipped.
    UnparsableLine {
        source: String,
        line: usize,
        text: String,
        reason: SkipReason,
    },
    /// An existing `(test, date)` value was superseded by a newer extraction.
    ValueConflict {
        source: String,
        test_name: TestName,
        date: NaiveDate,
        previous: String,
        current: String,
    },
    /// The whole document was rejected (decode failure, missing date).
    DocumentRejected { source: String, reason: String },
}

impl Diagnostic {
    pub fn severity(&self) -> Severity {
        match self {
            Self::EncodingFallback { .. } | Self::UnparsableLine { .. } => Severity::Warning,
            Self::ValueConflict { .. } => Severity::Notice,
            Self::DocumentRejected { .. } => Severity::Error,
        }
    }

    pub fn source(&self) -> &str {
        match self {
            Self::EncodingFallback { source, .. }
            | Self::UnparsableLine { source, .. }
            | Self::ValueConflict { source, .. }
            | Self::DocumentRejected { source, .. } => source,
        }
    }

    pub fn line(&self) -> Option<usize> {
        match self {
            Self::UnparsableLine { line, .. } => Some(*line),
            _ => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::EncodingFallback { .. } => "encoding-fallback",
            Self::UnparsableLine { .. } => "unparsable-line",
            Self::ValueConflict { .. } => "value-conflict",
            Self::DocumentRejected { .. } => "document-rejected",
        }
    }

    pub fn message(&self) -> String {
        match self {
            Self::EncodingFallback {
                detected,
                confidence,
                fallback,
                ..
            } => format!(
                "detected {detected} with confidence {confidence:.2}; decoded as {fallback}"
            ),
            Self::UnparsableLine { text, reason, .. } => format!("{reason}: {text}"),
            Self::ValueConflict {
                test_name,
                date,
                previous,
                current,
                ..
            } => format!("{test_name} on {date}: '{previous}' superseded by '{current}'"),
            Self::DocumentRejected { reason, .. } => reason.clone(),
        }
    }
}

/// Ordered collection of diagnostics for one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DiagnosticLog {
    entries: Vec<Diagnostic>,
}

impl DiagnosticLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.entries.push(diagnostic);
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.entries.iter()
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.entries
            .iter()
            .filter(|diagnostic| diagnostic.severity() == severity)
            .count()
    }

    /// Diagnostics sorted by severity (highest first), then source and line.
    pub fn sorted(&self) -> Vec<&Diagnostic> {
        let mut sorted: Vec<&Diagnostic> = self.entries.iter().collect();
        sorted.sort_by(|a, b| {
            b.severity()
                .cmp(&a.severity())
                .then_with(|| a.source().cmp(b.source()))
                .then_with(|| a.line().cmp(&b.line()))
        });
        sorted
    }
}

impl Extend<Diagnostic> for DiagnosticLog {
    fn extend<T: IntoIterator<Item = Diagnostic>>(&mut self, iter: T) {
        self.entries.extend(iter);
    }
}

impl<'a> IntoIterator for &'a DiagnosticLog {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
