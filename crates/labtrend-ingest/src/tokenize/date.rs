//! Report date location.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::{Captures, Regex};

/// Which kind of pattern produced the report date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateSource {
    /// A labelled header field such as `Rapor Tarihi: 10.05.2023`.
    Labelled,
    /// The timestamp of an export row (`10/05/2023 14:30`), at the start of
    /// a positioned row or in a `;` field.
    RowTimestamp,
    /// A bare ISO date.
    Iso,
}

/// The report date and where it was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportDate {
    pub date: NaiveDate,
    /// 1-based line number in the normalized text.
    pub line: usize,
    pub source: DateSource,
}

impl ReportDate {
    /// Line that holds header metadata rather than a result row.
    pub fn header_line(&self) -> Option<usize> {
        match self.source {
            DateSource::Labelled | DateSource::Iso => Some(self.line),
            DateSource::RowTimestamp => None,
        }
    }
}

const DATE: &str = r"(?P<date>\d{1,2}[./-]\d{1,2}[./-]\d{4}|\d{4}-\d{2}-\d{2})";

static REPORT_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)\b(?:(?:rapor|sonu[çc]|numune|kabul|onay)\s+tarihi|(?:report|collection|sample)\s+date)\s*[:：]?\s*{DATE}"
    ))
    .expect("valid regex")
});

static GENERIC_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)(?P<label>\b(?:tarihi?|date))\s*[:：]?\s*{DATE}"))
        .expect("valid regex")
});

/// `dd/mm/yyyy hh:mm` opening a positioned row or filling a `;` field.
static ROW_TIMESTAMP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|;)(?P<date>\d{2}/\d{2}/\d{4}) \d{2}:\d{2}(?:$|[;\t])")
        .expect("valid regex")
});

static TIMESTAMP_CELL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{2}/\d{2}/\d{4} \d{2}:\d{2}$").expect("valid regex"));

static ISO_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|[^\d-])(?P<date>\d{4}-\d{2}-\d{2})(?:$|[^\d-])").expect("valid regex")
});

/// Words that make a bare `Tarihi`/`Date` label a date of birth.
const BIRTH_WORDS: &[&str] = &["doğum", "dogum", "doğ.", "dog.", "birth", "d.tarihi"];

const DATE_FORMATS: &[&str] = &["%d.%m.%Y", "%d/%m/%Y", "%d-%m-%Y", "%Y-%m-%d"];

/// Parses a day-first or ISO date; `None` for impossible calendar dates.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(text.trim(), format).ok())
}

/// True for a cell holding exactly an export row timestamp.
pub fn is_row_timestamp(cell: &str) -> bool {
    TIMESTAMP_CELL.is_match(cell.trim())
}

fn is_birth_label(line: &str, caps: &Captures<'_>) -> bool {
    let Some(label) = caps.name("label") else {
        return false;
    };
    let before = line[..label.end()].to_lowercase();
    let qualifier = before
        .split_whitespace()
        .rev()
        .take(2)
        .collect::<Vec<_>>()
        .join(" ");
    BIRTH_WORDS.iter().any(|word| qualifier.contains(word))
}

/// Rejects a capture that is not a report date.
type Skip = fn(&str, &Captures<'_>) -> bool;

fn first_date(pattern: &Regex, line: &str, skip: Skip) -> Option<NaiveDate> {
    pattern
        .captures_iter(line)
        .filter(|caps| !skip(line, caps))
        .find_map(|caps| parse_date(&caps["date"]))
}

fn never(_: &str, _: &Captures<'_>) -> bool {
    false
}

/// Searches the first `header_lines` lines for the report date.
///
/// Each pattern is tried across the whole window before the next one:
/// report and collection labels, then a bare `Tarih`/`Date` label that is
/// not a birth date, then an export row timestamp, then a bare ISO date.
pub fn find_report_date(text: &str, header_lines: usize) -> Option<ReportDate> {
    let window: Vec<&str> = text.lines().take(header_lines).collect();
    let patterns: [(&Regex, Skip, DateSource); 4] = [
        (&*REPORT_LABEL, never, DateSource::Labelled),
        (&*GENERIC_LABEL, is_birth_label, DateSource::Labelled),
        (&*ROW_TIMESTAMP, never, DateSource::RowTimestamp),
        (&*ISO_DATE, never, DateSource::Iso),
    ];

    patterns.iter().find_map(|(pattern, skip, source)| {
        window.iter().enumerate().find_map(|(idx, line)| {
            first_date(pattern, line, *skip).map(|date| ReportDate {
                date,
                line: idx + 1,
                source: *source,
            })
        })
    })
}
