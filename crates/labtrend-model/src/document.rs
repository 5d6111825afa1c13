//! Tokenized report documents.

use chrono::NaiveDate;

/// One candidate table row, possibly spanning wrapped physical lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineGroup {
    /// 1-based line number of the first physical line in the normalized text.
    pub line: usize,
    /// Normalized text of the row, continuation lines joined by a column gap.
    pub text: String,
    /// Trimmed cells in reading order. Empty cells are kept where the layout
    /// had an explicit delimiter (`|` or `;`).
    pub cells: Vec<String>,
}

impl LineGroup {
    pub fn new(line: usize, text: impl Into<String>, cells: Vec<String>) -> Self {
        Self {
            line,
            text: text.into(),
            cells,
        }
    }

    /// Cells with content, in order.
    pub fn filled_cells(&self) -> Vec<&str> {
        self.cells
            .iter()
            .map(String::as_str)
            .filter(|cell| !cell.is_empty())
            .collect()
    }

    pub fn has_digit(&self) -> bool {
        self.text.chars().any(|ch| ch.is_ascii_digit())
    }
}

/// A report after tokenization: its date and its candidate rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportDocument {
    /// Stable identifier of the input, usually the file name.
    pub source: String,
    pub report_date: NaiveDate,
    pub groups: Vec<LineGroup>,
}
