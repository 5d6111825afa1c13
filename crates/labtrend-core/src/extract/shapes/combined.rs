//! Current and prior value printed in one field.
//!
//! Some report layouts print the previous result next to the current one
//! inside the same cell (`110 / 95`, `110 (95)`, `110 [95]`, `110 95`).
//! Which number is current cannot be told from the text alone, so the row is
//! identified and reported as unsupported instead of being mis-split.

use std::sync::LazyLock;

use labtrend_model::{LineGroup, UnsupportedShape};
use regex::Regex;

use super::has_letter;
use crate::extract::shape::{LineShape, ShapeContext, ShapeMatch, Specificity};

static COMBINED_VALUES: LazyLock<Regex> = LazyLock::new(|| {
    let num = r"-?(?:\d+(?:[.,]\d+)*|[.,]\d+)";
    Regex::new(&format!(
        r"^{num}(?:\s+/\s+{num}|\s*\(\s*{num}\s*\)|\s*\[\s*{num}\s*\]|\s+{num})$"
    ))
    .expect("valid regex")
});

/// Detects the combined current/prior field.
pub struct CombinedValue;

impl LineShape for CombinedValue {
    fn name(&self) -> &'static str {
        "combined-value"
    }

    fn description(&self) -> &'static str {
        "name | current and prior value in one field (unsupported)"
    }

    fn specificity(&self) -> Specificity {
        Specificity::new(3, 2)
    }

    fn parse(&self, group: &LineGroup, _ctx: &ShapeContext<'_>) -> ShapeMatch {
        let cells = group.filled_cells();
        match cells.as_slice() {
            [name, value, ..] if has_letter(name) && COMBINED_VALUES.is_match(value) => {
                ShapeMatch::Unsupported(UnsupportedShape::CombinedCurrentAndPrior)
            }
            _ => ShapeMatch::Unmatched,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::ExtractOptions;
    use chrono::NaiveDate;

    fn detect(line: &str) -> ShapeMatch {
        let options = ExtractOptions::default();
        let ctx = ShapeContext {
            report_date: NaiveDate::from_ymd_opt(2023, 5, 10).unwrap(),
            options: &options,
        };
        let cells = line.split('\t').map(str::to_string).collect();
        CombinedValue.parse(&LineGroup::new(1, line, cells), &ctx)
    }

    #[test]
    fn combined_forms_are_unsupported() {
        for line in [
            "Glukoz\t110 / 95\tmg/dL",
            "Glukoz\t110 (95)\tmg/dL",
            "Glukoz\t110 [95]",
            "Hemoglobin\t13,5 12,9\tg/dL",
        ] {
            assert_eq!(
                detect(line),
                ShapeMatch::Unsupported(UnsupportedShape::CombinedCurrentAndPrior),
                "{line}"
            );
        }
    }

    #[test]
    fn single_values_and_titers_pass_through() {
        assert!(detect("Glukoz\t110 (E)\tmg/dL").is_unmatched());
        assert!(detect("Glukoz\t95\tmg/dL").is_unmatched());
        assert!(detect("ANA\t1/160").is_unmatched());
    }
}
