//! Qualitative rows: `name | Negatif | Negatif`.

use labtrend_model::{LineGroup, ObservationValue, ReferenceRange, TestName};

use super::{build_observation, has_letter, looks_like_unit};
use crate::extract::flag::is_qualitative;
use crate::extract::range::parse_range;
use crate::extract::shape::{LineShape, ShapeContext, ShapeMatch, Specificity};
use crate::extract::value::{ValueCell, parse_value_cell};

/// Row whose value is a word from the qualitative vocabulary.
pub struct Qualitative;

impl LineShape for Qualitative {
    fn name(&self) -> &'static str {
        "qualitative"
    }

    fn description(&self) -> &'static str {
        "name | text result | expected text"
    }

    fn specificity(&self) -> Specificity {
        Specificity::new(0, 2)
    }

    fn parse(&self, group: &LineGroup, ctx: &ShapeContext<'_>) -> ShapeMatch {
        let cells = group.filled_cells();
        let [name_cell, value_cell, rest @ ..] = cells.as_slice() else {
            return ShapeMatch::Unmatched;
        };
        if !has_letter(name_cell)
            || !is_qualitative(value_cell)
            || parse_value_cell(value_cell, ctx.options.decimal).is_some()
        {
            return ShapeMatch::Unmatched;
        }
        let Some(name) = TestName::canonical(name_cell) else {
            return ShapeMatch::Unmatched;
        };

        let mut range: Option<ReferenceRange> = None;
        let mut unit = None;
        for cell in rest {
            if range.is_none() && is_qualitative(cell) {
                range = Some(ReferenceRange::Text {
                    text: (*cell).to_string(),
                });
                continue;
            }
            if range.is_none() {
                match parse_range(cell, ctx.options.decimal) {
                    Ok(Some(parsed @ (ReferenceRange::Between { .. }
                    | ReferenceRange::Below { .. }
                    | ReferenceRange::Above { .. }))) => {
                        range = Some(parsed);
                        continue;
                    }
                    Err(reason) => return ShapeMatch::Invalid(reason),
                    _ => {}
                }
            }
            if unit.is_none() && looks_like_unit(cell) {
                unit = Some((*cell).to_string());
            }
        }

        let value = ValueCell {
            value: ObservationValue::Text((*value_cell).to_string()),
            marker: None,
        };
        ShapeMatch::Matched(build_observation(
            name,
            value,
            unit,
            range,
            ctx.report_date,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::ExtractOptions;
    use chrono::NaiveDate;
    use labtrend_model::Flag;

    fn run(line: &str) -> ShapeMatch {
        let options = ExtractOptions::default();
        let ctx = ShapeContext {
            report_date: NaiveDate::from_ymd_opt(2023, 5, 10).unwrap(),
            options: &options,
        };
        let cells = line.split('\t').map(str::to_string).collect();
        Qualitative.parse(&LineGroup::new(1, line, cells), &ctx)
    }

    #[test]
    fn matching_expected_text_is_normal() {
        let ShapeMatch::Matched(obs) = run("HBsAg\tNegatif\tNegatif") else {
            panic!("expected a match");
        };
        assert_eq!(obs.value, ObservationValue::Text("Negatif".to_string()));
        assert_eq!(obs.flag, Some(Flag::Normal));
    }

    #[test]
    fn differing_expected_text_is_abnormal() {
        let ShapeMatch::Matched(obs) = run("Nitrit\tPozitif\tNegatif") else {
            panic!("expected a match");
        };
        assert_eq!(obs.flag, Some(Flag::Abnormal));
    }

    #[test]
    fn without_expected_text_no_flag() {
        let ShapeMatch::Matched(obs) = run("İdrar Rengi\tSarı") else {
            panic!("expected a match");
        };
        assert_eq!(obs.flag, None);
        assert_eq!(obs.reference_range, None);
    }

    #[test]
    fn free_text_is_not_qualitative() {
        assert!(run("Hasta Adı\tAyşe Yılmaz").is_unmatched());
        assert!(run("Glukoz\t95").is_unmatched());
    }
}
