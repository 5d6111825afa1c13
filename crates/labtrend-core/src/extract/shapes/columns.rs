//! Free-form column rows: `name | value [marker] | unit? | range?`.
//!
//! Column widths and order vary between report types, so cell roles are
//! recognised by content: the first cell is the name, the first cell after
//! it that reads as a value is the value, and the cells after the value are
//! scanned for a numeric range and a unit. At least one of the two must be
//! present, which keeps header fields such as `Protokol No  12345` out.

use labtrend_model::{InvalidReason, LineGroup, ReferenceRange, TestName};

use super::{build_observation, has_letter, looks_like_unit};
use crate::extract::range::parse_numeric_range;
use crate::extract::shape::{LineShape, ShapeContext, ShapeMatch, Specificity};
use crate::extract::value::{ValueCell, is_marker_cell, marker_flag, parse_value_cell};

struct ColumnRow {
    name: TestName,
    value: ValueCell,
    unit: Option<String>,
    range: Option<ReferenceRange>,
}

fn read_columns(
    group: &LineGroup,
    ctx: &ShapeContext<'_>,
) -> Result<Option<ColumnRow>, InvalidReason> {
    let decimal = ctx.options.decimal;
    let cells = group.filled_cells();
    let Some((name_cell, rest)) = cells.split_first() else {
        return Ok(None);
    };
    if !has_letter(name_cell) {
        return Ok(None);
    }
    let Some((value_idx, mut value)) = rest
        .iter()
        .enumerate()
        .find_map(|(idx, cell)| parse_value_cell(cell, decimal).map(|value| (idx, value)))
    else {
        return Ok(None);
    };

    let mut tail = &rest[value_idx + 1..];
    if value.marker.is_none()
        && let Some((first, after)) = tail.split_first()
        && is_marker_cell(first)
    {
        value.marker = marker_flag(first);
        tail = after;
    }

    let mut unit = None;
    let mut range = None;
    for cell in tail {
        if range.is_none()
            && let Some(parsed) = parse_numeric_range(cell, decimal)
        {
            range = Some(parsed?);
            continue;
        }
        if unit.is_none() && looks_like_unit(cell) {
            unit = Some((*cell).to_string());
        }
    }
    if unit.is_none() && range.is_none() {
        return Ok(None);
    }

    let name = TestName::canonical(name_cell).ok_or(InvalidReason::EmptyTestName)?;
    Ok(Some(ColumnRow {
        name,
        value,
        unit,
        range,
    }))
}

fn parse_columns(
    group: &LineGroup,
    ctx: &ShapeContext<'_>,
    accept: impl Fn(&ColumnRow) -> bool,
) -> ShapeMatch {
    match read_columns(group, ctx) {
        Ok(Some(row)) if accept(&row) => ShapeMatch::Matched(build_observation(
            row.name,
            row.value,
            row.unit,
            row.range,
            ctx.report_date,
        )),
        Ok(_) => ShapeMatch::Unmatched,
        Err(reason) => ShapeMatch::Invalid(reason),
    }
}

/// Column row whose value carries an explicit marker such as `(E)` or `*`.
pub struct FlaggedColumns;

impl LineShape for FlaggedColumns {
    fn name(&self) -> &'static str {
        "flagged-columns"
    }

    fn description(&self) -> &'static str {
        "name | value + marker | unit | range"
    }

    fn specificity(&self) -> Specificity {
        Specificity::new(2, 2)
    }

    fn parse(&self, group: &LineGroup, ctx: &ShapeContext<'_>) -> ShapeMatch {
        parse_columns(group, ctx, |row| row.value.marker.is_some())
    }
}

/// Column row with a plain numeric or censored value.
pub struct NumericColumns;

impl LineShape for NumericColumns {
    fn name(&self) -> &'static str {
        "numeric-columns"
    }

    fn description(&self) -> &'static str {
        "name | value | unit | range"
    }

    fn specificity(&self) -> Specificity {
        Specificity::new(1, 2)
    }

    fn parse(&self, group: &LineGroup, ctx: &ShapeContext<'_>) -> ShapeMatch {
        parse_columns(group, ctx, |row| row.value.marker.is_none())
    }
}
