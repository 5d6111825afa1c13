//! Result extractor: candidate line groups to typed observations.
//!
//! # Architecture
//!
//! Every known row layout implements [`LineShape`]. The [`Extractor`] keeps
//! the registered shapes sorted by [`Specificity`] (most literal first, then
//! by name) and tries them in that order. The first shape that answers
//! anything other than [`ShapeMatch::Unmatched`] decides the row:
//!
//! | Outcome | Effect |
//! |---------|--------|
//! | `Matched` | one [`Observation`] |
//! | `Unsupported` | skipped, `UnparsableLine` warning |
//! | `Invalid` | skipped, `UnparsableLine` warning |
//! | no shape | skipped; a warning only when the row contains a digit |
//!
//! # Built-in shapes
//!
//! | Shape | Anchors | Layout |
//! |-------|---------|--------|
//! | `timestamped-export` | 5 | `timestamp \| prior \| range \| unit \| value \| name` |
//! | `semicolon-export` | 4 | 13+ `;` fields, timestamp in field 13 |
//! | `combined-value` | 3 | current and prior value in one field (unsupported) |
//! | `flagged-columns` | 2 | `name \| value marker \| unit \| range` |
//! | `numeric-columns` | 1 | `name \| value \| unit \| range` |
//! | `qualitative` | 0 | `name \| text \| expected text` |

pub mod flag;
pub mod range;
pub mod shape;
pub mod shapes;
pub mod value;

use std::sync::OnceLock;

use chrono::NaiveDate;
use labtrend_model::{Diagnostic, LineGroup, Observation, ReportDocument, SkipReason};
use tracing::{debug, warn};

use crate::merge::collapse_duplicates;

pub use shape::{LineShape, ShapeContext, ShapeMatch, Specificity};
pub use shapes::builtin_shapes;
pub use value::DecimalConvention;

/// Options for result extraction.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtractOptions {
    /// Decimal separator convention of the source reports.
    pub decimal: DecimalConvention,
}

impl ExtractOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_decimal(mut self, decimal: DecimalConvention) -> Self {
        self.decimal = decimal;
        self
    }
}

/// Outcome of extracting one line group.
#[derive(Debug, Clone, PartialEq)]
pub enum GroupOutcome {
    Extracted {
        shape: &'static str,
        observation: Observation,
    },
    Skipped {
        /// Shape that identified the row, `None` when no shape applied.
        shape: Option<&'static str>,
        reason: SkipReason,
    },
}

/// Everything extracted from one document.
#[derive(Debug, Clone, Default)]
pub struct DocumentExtraction {
    /// Observations in document order.
    pub observations: Vec<Observation>,
    /// Skipped lines worth reporting.
    pub diagnostics: Vec<Diagnostic>,
    /// All skipped groups, including quiet ones.
    pub skipped: usize,
}

/// Ordered decision list of line shapes.
pub struct Extractor {
    shapes: Vec<Box<dyn LineShape>>,
}

impl Default for Extractor {
    fn default() -> Self {
        let mut extractor = Self::empty();
        for shape in builtin_shapes() {
            extractor.register(shape);
        }
        extractor
    }
}

impl Extractor {
    /// Creates an extractor with the built-in shapes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an extractor without any shapes.
    pub fn empty() -> Self {
        Self { shapes: Vec::new() }
    }

    /// Registers a shape, replacing any shape with the same name.
    pub fn register(&mut self, shape: Box<dyn LineShape>) {
        self.shapes.retain(|existing| existing.name() != shape.name());
        self.shapes.push(shape);
        self.shapes.sort_by(|a, b| {
            b.specificity()
                .cmp(&a.specificity())
                .then_with(|| a.name().cmp(b.name()))
        });
    }

    /// Shapes in the order they are tried.
    pub fn shapes(&self) -> impl Iterator<Item = &dyn LineShape> + '_ {
        self.shapes.iter().map(|shape| shape.as_ref())
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Runs the decision list over one group.
    pub fn extract_group(
        &self,
        group: &LineGroup,
        report_date: NaiveDate,
        options: &ExtractOptions,
    ) -> GroupOutcome {
        let ctx = ShapeContext {
            report_date,
            options,
        };
        for shape in &self.shapes {
            let outcome = match shape.parse(group, &ctx) {
                ShapeMatch::Unmatched => continue,
                ShapeMatch::Matched(observation) => GroupOutcome::Extracted {
                    shape: shape.name(),
                    observation,
                },
                ShapeMatch::Unsupported(unsupported) => GroupOutcome::Skipped {
                    shape: Some(shape.name()),
                    reason: SkipReason::Unsupported { shape: unsupported },
                },
                ShapeMatch::Invalid(detail) => GroupOutcome::Skipped {
                    shape: Some(shape.name()),
                    reason: SkipReason::Invalid { detail },
                },
            };
            return outcome;
        }
        GroupOutcome::Skipped {
            shape: None,
            reason: SkipReason::NoShapeMatched,
        }
    }

    /// Extracts every group of a document.
    ///
    /// Never fails: rows that cannot be read become diagnostics. A test
    /// reported twice for the same date keeps its last value.
    pub fn extract_document(
        &self,
        document: &ReportDocument,
        options: &ExtractOptions,
    ) -> DocumentExtraction {
        let mut extraction = DocumentExtraction::default();

        for group in &document.groups {
            match self.extract_group(group, document.report_date, options) {
                GroupOutcome::Extracted { shape, observation } => {
                    debug!(
                        source = %document.source,
                        line = group.line,
                        shape,
                        test = %observation.test_name,
                        "extracted result"
                    );
                    extraction.observations.push(observation);
                }
                GroupOutcome::Skipped { shape, reason } => {
                    extraction.skipped += 1;
                    let reportable =
                        !matches!(reason, SkipReason::NoShapeMatched) || group.has_digit();
                    if !reportable {
                        continue;
                    }
                    if matches!(reason, SkipReason::NoShapeMatched) {
                        debug!(source = %document.source, line = group.line, "no shape matched");
                    } else {
                        warn!(
                            source = %document.source,
                            line = group.line,
                            shape = shape.unwrap_or("-"),
                            reason = %reason,
                            "skipped result line"
                        );
                    }
                    extraction.diagnostics.push(Diagnostic::UnparsableLine {
                        source: document.source.clone(),
                        line: group.line,
                        text: group.text.clone(),
                        reason,
                    });
                }
            }
        }

        let (observations, notices) =
            collapse_duplicates(std::mem::take(&mut extraction.observations), &document.source);
        extraction.observations = observations;
        extraction.diagnostics.extend(notices);
        extraction
    }
}

static DEFAULT_EXTRACTOR: OnceLock<Extractor> = OnceLock::new();

/// Shared extractor with the built-in shapes.
pub fn default_extractor() -> &'static Extractor {
    DEFAULT_EXTRACTOR.get_or_init(Extractor::new)
}

#[cfg(test)]
mod tests {
    use super::*;
    use labtrend_model::{Flag, ObservationValue, ReferenceRange, UnsupportedShape};

    fn may_10() -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 5, 10).unwrap()
    }

    fn group(line: &str) -> LineGroup {
        let cells = line.split('\t').map(str::to_string).collect();
        LineGroup::new(4, line, cells)
    }

    fn extract(line: &str) -> GroupOutcome {
        default_extractor().extract_group(&group(line), may_10(), &ExtractOptions::default())
    }

    #[test]
    fn decision_list_order() {
        let names: Vec<&str> = default_extractor().shapes().map(|s| s.name()).collect();
        assert_eq!(
            names,
            vec![
                "timestamped-export",
                "semicolon-export",
                "combined-value",
                "flagged-columns",
                "numeric-columns",
                "qualitative",
            ]
        );
    }

    #[test]
    fn glucose_normal() {
        let GroupOutcome::Extracted { shape, observation } = extract("Glukoz\t95\tmg/dL\t70-100")
        else {
            panic!("expected extraction");
        };
        assert_eq!(shape, "numeric-columns");
        assert_eq!(observation.test_name.as_str(), "Glukoz");
        assert_eq!(observation.value.as_f64(), Some(95.0));
        assert_eq!(observation.unit.as_deref(), Some("mg/dL"));
        assert_eq!(
            observation.reference_range,
            Some(ReferenceRange::Between {
                low: 70.0,
                high: 100.0
            })
        );
        assert_eq!(observation.flag, Some(Flag::Normal));
        assert_eq!(observation.report_date, may_10());
    }

    #[test]
    fn glucose_flagged_high() {
        let GroupOutcome::Extracted { shape, observation } =
            extract("Glukoz\t110 (E)\tmg/dL\t70-100")
        else {
            panic!("expected extraction");
        };
        assert_eq!(shape, "flagged-columns");
        assert_eq!(observation.value.as_f64(), Some(110.0));
        assert_eq!(observation.flag, Some(Flag::High));
    }

    #[test]
    fn comma_decimal_keeps_raw_text() {
        let GroupOutcome::Extracted { observation, .. } = extract("Potasyum\t7,2\tmmol/L\t3,5-5,1")
        else {
            panic!("expected extraction");
        };
        assert_eq!(
            observation.value,
            ObservationValue::Numeric {
                value: 7.2,
                raw: "7,2".to_string()
            }
        );
        assert_eq!(observation.to_entry().raw_text, "7,2");
    }

    #[test]
    fn combined_value_is_skipped() {
        assert_eq!(
            extract("Glukoz\t110 / 95\tmg/dL\t70-100"),
            GroupOutcome::Skipped {
                shape: Some("combined-value"),
                reason: SkipReason::Unsupported {
                    shape: UnsupportedShape::CombinedCurrentAndPrior
                },
            }
        );
    }

    #[test]
    fn unmatched_without_digits_is_quiet() {
        let document = ReportDocument {
            source: "r.txt".to_string(),
            report_date: may_10(),
            groups: vec![
                group("Tetkik\tSonuç\tBirim"),
                group("Protokol No\t12345"),
                group("Glukoz\t95\tmg/dL\t70-100"),
            ],
        };
        let extraction = default_extractor().extract_document(&document, &ExtractOptions::default());
        assert_eq!(extraction.observations.len(), 1);
        assert_eq!(extraction.skipped, 2);
        assert_eq!(extraction.diagnostics.len(), 1);
        assert!(matches!(
            &extraction.diagnostics[0],
            Diagnostic::UnparsableLine { reason: SkipReason::NoShapeMatched, .. }
        ));
    }

    #[test]
    fn repeated_test_collapses_to_last_value() {
        let document = ReportDocument {
            source: "r.txt".to_string(),
            report_date: may_10(),
            groups: vec![
                group("Glukoz\t95\tmg/dL\t70-100"),
                group("Üre\t30\tmg/dL\t17-43"),
                group("Glukoz\t101\tmg/dL\t70-100"),
            ],
        };
        let extraction = default_extractor().extract_document(&document, &ExtractOptions::default());
        let raw: Vec<&str> = extraction
            .observations
            .iter()
            .map(|obs| obs.value.raw_text())
            .collect();
        assert_eq!(raw, vec!["101", "30"]);
        let [Diagnostic::ValueConflict {
            source,
            previous,
            current,
            ..
        }] = extraction.diagnostics.as_slice()
        else {
            panic!("expected one conflict notice");
        };
        assert_eq!(source, "r.txt");
        assert_eq!(previous, "95");
        assert_eq!(current, "101");
    }

    struct Everything;

    impl LineShape for Everything {
        fn name(&self) -> &'static str {
            "numeric-columns"
        }

        fn description(&self) -> &'static str {
            "replacement"
        }

        fn specificity(&self) -> Specificity {
            Specificity::new(9, 1)
        }

        fn parse(&self, _group: &LineGroup, _ctx: &ShapeContext<'_>) -> ShapeMatch {
            ShapeMatch::Unmatched
        }
    }

    #[test]
    fn register_replaces_by_name_and_resorts() {
        let mut extractor = Extractor::new();
        let before = extractor.len();
        extractor.register(Box::new(Everything));
        assert_eq!(extractor.len(), before);
        let first = extractor.shapes().next().unwrap();
        assert_eq!(first.description(), "replacement");
    }
}
