//! Fixed-position rows of the hospital system's own exports.
//!
//! Both layouts carry a `dd/mm/yyyy hh:mm` collection timestamp per row,
//! which takes precedence over the document date.

use std::sync::LazyLock;

use chrono::NaiveDate;
use labtrend_model::{InvalidReason, LineGroup, TestName};
use regex::Regex;

use super::{build_observation, non_empty};
use crate::extract::range::parse_range;
use crate::extract::shape::{LineShape, ShapeContext, ShapeMatch, Specificity};
use crate::extract::value::parse_value_cell;

static ROW_TIMESTAMP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<date>\d{2}/\d{2}/\d{4}) \d{2}:\d{2}$").expect("valid regex")
});

/// `None` when the cell is not a timestamp at all.
fn timestamp_date(cell: &str) -> Option<Result<NaiveDate, InvalidReason>> {
    let caps = ROW_TIMESTAMP.captures(cell.trim())?;
    Some(
        NaiveDate::parse_from_str(&caps["date"], "%d/%m/%Y").map_err(|_| {
            InvalidReason::BadTimestamp {
                text: cell.trim().to_string(),
            }
        }),
    )
}

struct ExportFields<'a> {
    timestamp: &'a str,
    name: &'a str,
    value: &'a str,
    unit: &'a str,
    range: &'a str,
}

fn read_export(fields: &ExportFields<'_>, ctx: &ShapeContext<'_>) -> ShapeMatch {
    let date = match timestamp_date(fields.timestamp) {
        None => return ShapeMatch::Unmatched,
        Some(Err(reason)) => return ShapeMatch::Invalid(reason),
        Some(Ok(date)) => date,
    };
    let Some(name) = TestName::canonical(fields.name) else {
        return ShapeMatch::Invalid(InvalidReason::EmptyTestName);
    };
    let Some(value) = parse_value_cell(fields.value, ctx.options.decimal) else {
        return ShapeMatch::Invalid(InvalidReason::UnreadableValue {
            text: fields.value.trim().to_string(),
        });
    };
    let range = match parse_range(fields.range, ctx.options.decimal) {
        Ok(range) => range,
        Err(reason) => return ShapeMatch::Invalid(reason),
    };
    ShapeMatch::Matched(build_observation(
        name,
        value,
        non_empty(fields.unit),
        range,
        date,
    ))
}

/// `timestamp | prior | range | unit | value | name | ...` rows from the
/// positioned HTML rendering.
pub struct TimestampedExport;

impl LineShape for TimestampedExport {
    fn name(&self) -> &'static str {
        "timestamped-export"
    }

    fn description(&self) -> &'static str {
        "timestamp | prior | range | unit | value | name (HTML export row)"
    }

    fn specificity(&self) -> Specificity {
        Specificity::new(5, 6)
    }

    fn parse(&self, group: &LineGroup, ctx: &ShapeContext<'_>) -> ShapeMatch {
        let cells = &group.cells;
        if cells.len() < 6 {
            return ShapeMatch::Unmatched;
        }
        read_export(
            &ExportFields {
                timestamp: &cells[0],
                range: &cells[2],
                unit: &cells[3],
                value: &cells[4],
                name: &cells[5],
            },
            ctx,
        )
    }
}

/// `;`-delimited rows with the timestamp in the thirteenth field.
pub struct SemicolonExport;

impl LineShape for SemicolonExport {
    fn name(&self) -> &'static str {
        "semicolon-export"
    }

    fn description(&self) -> &'static str {
        "name;;;value;unit;range;;prior;;;;;timestamp; (CSV export row)"
    }

    fn specificity(&self) -> Specificity {
        Specificity::new(4, 13)
    }

    fn parse(&self, group: &LineGroup, ctx: &ShapeContext<'_>) -> ShapeMatch {
        let cells = &group.cells;
        if cells.len() < 13 {
            return ShapeMatch::Unmatched;
        }
        read_export(
            &ExportFields {
                timestamp: &cells[12],
                name: &cells[0],
                value: &cells[3],
                unit: &cells[4],
                range: &cells[5],
            },
            ctx,
        )
    }
}
