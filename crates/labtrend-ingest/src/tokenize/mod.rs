//! Layout tokenizer: normalized text to a report date and candidate rows.

pub mod cells;
pub mod date;

use std::iter::{Enumerate, Peekable};
use std::str::Lines;

use labtrend_model::{DocumentError, LineGroup, ReportDocument};
use tracing::debug;

pub use cells::{filled_count, split_cells};
pub use date::{DateSource, ReportDate, find_report_date, is_row_timestamp, parse_date};

use crate::normalize::COLUMN_GAP;

/// Default number of leading lines searched for the report date.
pub const DEFAULT_HEADER_LINES: usize = 40;

/// Options for tokenization.
#[derive(Debug, Clone, Copy)]
pub struct TokenizeOptions {
    /// Number of leading lines searched for the report date.
    pub header_lines: usize,
}

impl Default for TokenizeOptions {
    fn default() -> Self {
        Self {
            header_lines: DEFAULT_HEADER_LINES,
        }
    }
}

impl TokenizeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_header_lines(mut self, lines: usize) -> Self {
        self.header_lines = lines.max(1);
        self
    }
}

/// Lazy sequence of candidate rows over normalized text.
///
/// A line is a candidate when it has at least two non-empty cells. A line
/// that starts with a column gap and holds a single cell is a wrapped
/// continuation: its text extends the name cell of the row above. The name
/// is the first filled cell, or the last cell with a letter when the row
/// opens with an export timestamp.
pub struct LineGroups<'a> {
    lines: Peekable<Enumerate<Lines<'a>>>,
    skip_line: Option<usize>,
}

impl<'a> LineGroups<'a> {
    /// Iterates candidate rows of `text`, skipping the 1-based `skip_line`.
    pub fn new(text: &'a str, skip_line: Option<usize>) -> Self {
        Self {
            lines: text.lines().enumerate().peekable(),
            skip_line,
        }
    }

    fn is_continuation(&self, idx: usize, line: &str) -> bool {
        Some(idx + 1) != self.skip_line
            && line.starts_with(COLUMN_GAP)
            && filled_count(&split_cells(line)) == 1
    }
}

impl Iterator for LineGroups<'_> {
    type Item = LineGroup;

    fn next(&mut self) -> Option<LineGroup> {
        loop {
            let (idx, line) = self.lines.next()?;
            if Some(idx + 1) == self.skip_line {
                continue;
            }
            let cells = split_cells(line);
            if filled_count(&cells) < 2 {
                continue;
            }

            let mut group = LineGroup::new(idx + 1, line.trim(), cells);
            while let Some(&(next_idx, next_line)) = self.lines.peek() {
                if !self.is_continuation(next_idx, next_line) {
                    break;
                }
                let wrapped = next_line.trim();
                group.text.push(COLUMN_GAP);
                group.text.push_str(wrapped);
                if let Some(name) = name_cell(&mut group.cells) {
                    name.push(' ');
                    name.push_str(wrapped);
                }
                self.lines.next();
            }
            return Some(group);
        }
    }
}

fn name_cell(cells: &mut [String]) -> Option<&mut String> {
    let first = cells.iter().position(|cell| !cell.is_empty())?;
    if !is_row_timestamp(&cells[first]) {
        return cells.get_mut(first);
    }
    cells
        .iter_mut()
        .rev()
        .find(|cell| cell.chars().any(char::is_alphabetic))
}

/// Locates the report date and returns the lazy row sequence.
pub fn tokenize<'a>(
    text: &'a str,
    options: &TokenizeOptions,
) -> Result<(ReportDate, LineGroups<'a>), DocumentError> {
    let report_date =
        find_report_date(text, options.header_lines).ok_or(DocumentError::MissingDate {
            searched_lines: options.header_lines,
        })?;
    debug!(
        date = %report_date.date,
        line = report_date.line,
        source = ?report_date.source,
        "report date located"
    );
    Ok((report_date, LineGroups::new(text, report_date.header_line())))
}

/// Tokenizes a whole document into a [`ReportDocument`].
pub fn tokenize_document(
    text: &str,
    source: &str,
    options: &TokenizeOptions,
) -> Result<ReportDocument, DocumentError> {
    let (report_date, groups) = tokenize(text, options)?;
    Ok(ReportDocument {
        source: source.to_string(),
        report_date: report_date.date,
        groups: groups.collect(),
    })
}
