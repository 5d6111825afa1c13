//! Typed laboratory observations.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::history::{EntryValue, HistoryEntry};

/// Canonical laboratory test identifier.
///
/// Canonicalization trims the name, strips leading list markers and a
/// trailing colon, and collapses internal whitespace. Case is preserved
/// because report names are display names (e.g. "Glukoz").
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TestName(String);

impl TestName {
    /// Returns `None` when nothing usable is left after canonicalization.
    pub fn canonical(raw: &str) -> Option<Self> {
        let stripped = raw
            .trim()
            .trim_start_matches(['*', '-', '•', '·'])
            .trim_end_matches([':', '：'])
            .trim();
        let collapsed = stripped.split_whitespace().collect::<Vec<_>>().join(" ");
        if collapsed.is_empty() {
            None
        } else {
            Some(Self(collapsed))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TestName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for TestName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A measured value, either numeric or qualitative.
#[derive(Debug, Clone, PartialEq)]
pub enum ObservationValue {
    /// Numeric result in dot-decimal form; `raw` keeps the report's text (e.g. "7,2").
    Numeric { value: f64, raw: String },
    /// Qualitative or censored result kept verbatim (e.g. "Negatif", "<0.5").
    Text(String),
}

impl ObservationValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Numeric { value, .. } => Some(*value),
            Self::Text(_) => None,
        }
    }

    /// Text exactly as it appeared on the report.
    pub fn raw_text(&self) -> &str {
        match self {
            Self::Numeric { raw, .. } => raw,
            Self::Text(text) => text,
        }
    }
}

/// Interpretation flag of a result against its reference range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Flag {
    Normal,
    High,
    Low,
    Abnormal,
}

impl Flag {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::High => "high",
            Self::Low => "low",
            Self::Abnormal => "abnormal",
        }
    }
}

impl fmt::Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reference interval printed next to a result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReferenceRange {
    /// Closed interval `low-high`.
    Between { low: f64, high: f64 },
    /// Upper bound only (`< high`, `<= high`).
    Below { high: f64, inclusive: bool },
    /// Lower bound only (`> low`, `>= low`).
    Above { low: f64, inclusive: bool },
    /// Free text such as "Negatif".
    Text { text: String },
}

impl ReferenceRange {
    /// Classifies a numeric value against this range.
    ///
    /// Returns `None` for textual ranges.
    pub fn classify(&self, value: f64) -> Option<Flag> {
        let flag = match self {
            Self::Between { low, high } => {
                if value < *low {
                    Flag::Low
                } else if value > *high {
                    Flag::High
                } else {
                    Flag::Normal
                }
            }
            Self::Below { high, inclusive } => {
                let within = if *inclusive {
                    value <= *high
                } else {
                    value < *high
                };
                if within { Flag::Normal } else { Flag::High }
            }
            Self::Above { low, inclusive } => {
                let within = if *inclusive {
                    value >= *low
                } else {
                    value > *low
                };
                if within { Flag::Normal } else { Flag::Low }
            }
            Self::Text { .. } => return None,
        };
        Some(flag)
    }
}

impl fmt::Display for ReferenceRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Between { low, high } => write!(f, "{low}-{high}"),
            Self::Below { high, inclusive } => {
                write!(f, "{} {high}", if *inclusive { "<=" } else { "<" })
            }
            Self::Above { low, inclusive } => {
                write!(f, "{} {low}", if *inclusive { ">=" } else { ">" })
            }
            Self::Text { text } => f.write_str(text),
        }
    }
}

/// One measured test result on one date.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub test_name: TestName,
    pub value: ObservationValue,
    pub unit: Option<String>,
    pub reference_range: Option<ReferenceRange>,
    pub flag: Option<Flag>,
    pub report_date: NaiveDate,
}

impl Observation {
    /// Converts to the persisted record form.
    pub fn to_entry(&self) -> HistoryEntry {
        let value = match &self.value {
            ObservationValue::Numeric { value, .. } => EntryValue::Number(*value),
            ObservationValue::Text(text) => EntryValue::Text(text.clone()),
        };
        HistoryEntry {
            date: self.report_date,
            value,
            unit: self.unit.clone(),
            reference_range: self.reference_range.clone(),
            flag: self.flag,
            raw_text: self.value.raw_text().to_string(),
        }
    }

    /// Rebuilds an observation from a persisted record.
    pub fn from_entry(test_name: TestName, entry: &HistoryEntry) -> Self {
        let value = match &entry.value {
            EntryValue::Number(value) => ObservationValue::Numeric {
                value: *value,
                raw: entry.raw_text.clone(),
            },
            EntryValue::Text(text) => ObservationValue::Text(text.clone()),
        };
        Self {
            test_name,
            value,
            unit: entry.unit.clone(),
            reference_range: entry.reference_range.clone(),
            flag: entry.flag,
            report_date: entry.date,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_name_collapses_whitespace_and_markers() {
        let name = TestName::canonical("  * Glukoz   (Açlık) : ").unwrap();
        assert_eq!(name.as_str(), "Glukoz (Açlık)");
    }

    #[test]
    fn canonical_name_rejects_blank() {
        assert!(TestName::canonical("  :  ").is_none());
        assert!(TestName::canonical("").is_none());
    }

    #[test]
    fn between_range_is_inclusive() {
        let range = ReferenceRange::Between {
            low: 70.0,
            high: 100.0,
        };
        assert_eq!(range.classify(70.0), Some(Flag::Normal));
        assert_eq!(range.classify(100.0), Some(Flag::Normal));
        assert_eq!(range.classify(110.0), Some(Flag::High));
        assert_eq!(range.classify(69.9), Some(Flag::Low));
    }

    #[test]
    fn single_sided_bounds_respect_inclusivity() {
        let strict = ReferenceRange::Below {
            high: 5.0,
            inclusive: false,
        };
        assert_eq!(strict.classify(5.0), Some(Flag::High));
        assert_eq!(strict.classify(4.9), Some(Flag::Normal));

        let at_least = ReferenceRange::Above {
            low: 40.0,
            inclusive: true,
        };
        assert_eq!(at_least.classify(40.0), Some(Flag::Normal));
        assert_eq!(at_least.classify(39.0), Some(Flag::Low));

        let text = ReferenceRange::Text {
            text: "Negatif".to_string(),
        };
        assert_eq!(text.classify(1.0), None);
    }

    #[test]
    fn range_display() {
        let range = ReferenceRange::Between {
            low: 3.5,
            high: 5.1,
        };
        assert_eq!(range.to_string(), "3.5-5.1");
        let below = ReferenceRange::Below {
            high: 200.0,
            inclusive: false,
        };
        assert_eq!(below.to_string(), "< 200");
    }

    #[test]
    fn entry_round_trip_keeps_raw_text() {
        let observation = Observation {
            test_name: TestName::canonical("Hemoglobin").unwrap(),
            value: ObservationValue::Numeric {
                value: 7.2,
                raw: "7,2".to_string(),
            },
            unit: Some("g/dL".to_string()),
            reference_range: None,
            flag: None,
            report_date: NaiveDate::from_ymd_opt(2023, 5, 10).unwrap(),
        };
        let entry = observation.to_entry();
        assert_eq!(entry.raw_text, "7,2");
        assert_eq!(entry.value, EntryValue::Number(7.2));

        let back = Observation::from_entry(observation.test_name.clone(), &entry);
        assert_eq!(back, observation);
    }
}
