//! Built-in line shapes.

mod columns;
mod combined;
mod export;
mod qualitative;

pub use columns::{FlaggedColumns, NumericColumns};
pub use combined::CombinedValue;
pub use export::{SemicolonExport, TimestampedExport};
pub use qualitative::Qualitative;

use chrono::NaiveDate;
use labtrend_model::{Observation, ReferenceRange, TestName};

use super::flag::derive_flag;
use super::shape::LineShape;
use super::value::ValueCell;

/// All built-in shapes, in no particular order.
pub fn builtin_shapes() -> Vec<Box<dyn LineShape>> {
    vec![
        Box::new(TimestampedExport),
        Box::new(SemicolonExport),
        Box::new(CombinedValue),
        Box::new(FlaggedColumns),
        Box::new(NumericColumns),
        Box::new(Qualitative),
    ]
}

fn has_letter(text: &str) -> bool {
    text.chars().any(char::is_alphabetic)
}

fn non_empty(text: &str) -> Option<String> {
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

/// Unit spellings without a `/`, `%` or exponent, compared case-insensitively.
const BARE_UNITS: &[&str] = &[
    "g", "mg", "µg", "ug", "ng", "pg", "l", "ml", "dl", "fl", "mmol", "µmol", "umol", "nmol",
    "pmol", "meq", "iu", "miu", "u", "mu", "ku", "sn", "sec", "s", "mm", "mmhg", "inr", "ratio",
    "titre", "titer", "kopya", "hpf",
];

/// A short cell with unit notation (`mg/dL`, `%`, `10^3/µL`) or a known bare unit.
fn looks_like_unit(cell: &str) -> bool {
    let cell = cell.trim();
    if cell.is_empty() || cell.chars().count() > 20 {
        return false;
    }
    if cell
        .chars()
        .any(|ch| matches!(ch, '/' | '%' | '^' | 'µ' | 'μ' | '³' | '‰'))
    {
        return true;
    }
    let lower = cell.to_lowercase();
    BARE_UNITS.contains(&lower.as_str())
}

fn build_observation(
    test_name: TestName,
    value: ValueCell,
    unit: Option<String>,
    reference_range: Option<ReferenceRange>,
    report_date: NaiveDate,
) -> Observation {
    let flag = derive_flag(&value.value, value.marker, reference_range.as_ref());
    Observation {
        test_name,
        value: value.value,
        unit,
        reference_range,
        flag,
        report_date,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_cells_need_unit_notation() {
        for unit in ["mg/dL", "%", "10^3/µL", "IU", "sn", "fL"] {
            assert!(looks_like_unit(unit), "{unit}");
        }
        for text in ["Açlık", "Hemolizli", "Tokluk 2. saat", ""] {
            assert!(!looks_like_unit(text), "{text}");
        }
    }
}
