//! History merger: folds extracted observations into a [`TestHistory`].
//!
//! Merging goes through [`TestHistory::upsert`], so the ordering and
//! uniqueness invariants hold after every observation. A differing value for
//! an existing `(test, date)` key replaces the old one and is reported as a
//! [`Diagnostic::ValueConflict`]. Nothing is ever removed.
//!
//! A document listing the same `(test, date)` key twice is collapsed first by
//! [`collapse_duplicates`], so merging one document is idempotent.

use std::collections::HashMap;

use chrono::NaiveDate;
use labtrend_model::{Diagnostic, Observation, TestHistory, TestName, Upsert};
use tracing::{debug, warn};

/// Counts and notices produced by one merge.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergeReport {
    pub inserted: usize,
    pub unchanged: usize,
    pub superseded: usize,
    /// One `ValueConflict` per superseded entry.
    pub notices: Vec<Diagnostic>,
}

impl MergeReport {
    /// True when the history was modified.
    pub fn changed(&self) -> bool {
        self.inserted > 0 || self.superseded > 0
    }

    pub fn total(&self) -> usize {
        self.inserted + self.unchanged + self.superseded
    }

    /// Adds the counts and notices of `other` to this report.
    pub fn absorb(&mut self, other: MergeReport) {
        self.inserted += other.inserted;
        self.unchanged += other.unchanged;
        self.superseded += other.superseded;
        self.notices.extend(other.notices);
    }
}

/// Collapses observations of one document that share a `(test, date)` key.
///
/// The last observation wins and takes the place of the first. Each
/// replacement by a different result yields one `ValueConflict` notice.
pub fn collapse_duplicates(
    observations: impl IntoIterator<Item = Observation>,
    source: &str,
) -> (Vec<Observation>, Vec<Diagnostic>) {
    let mut kept: Vec<Observation> = Vec::new();
    let mut positions: HashMap<(TestName, NaiveDate), usize> = HashMap::new();
    let mut notices = Vec::new();

    for observation in observations {
        let key = (observation.test_name.clone(), observation.report_date);
        let Some(&idx) = positions.get(&key) else {
            positions.insert(key, kept.len());
            kept.push(observation);
            continue;
        };
        let previous = kept[idx].to_entry();
        let current = observation.to_entry();
        if previous.same_result(&current) {
            continue;
        }
        warn!(
            source,
            test = %observation.test_name,
            date = %observation.report_date,
            "duplicate result in document"
        );
        notices.push(Diagnostic::ValueConflict {
            source: source.to_string(),
            test_name: observation.test_name.clone(),
            date: observation.report_date,
            previous: previous.raw_text,
            current: current.raw_text,
        });
        kept[idx] = observation;
    }

    (kept, notices)
}

/// Merges observations into `history`.
///
/// Duplicate keys are collapsed first, so merging the same slice twice leaves
/// the history untouched the second time.
pub fn merge_observations(
    history: &mut TestHistory,
    observations: &[Observation],
    source: &str,
) -> MergeReport {
    let (observations, notices) = collapse_duplicates(observations.iter().cloned(), source);
    let mut report = MergeReport {
        notices,
        ..MergeReport::default()
    };

    for observation in &observations {
        let entry = observation.to_entry();
        let current = entry.raw_text.clone();
        match history.upsert(observation.test_name.clone(), entry) {
            Upsert::Inserted => report.inserted += 1,
            Upsert::Unchanged => report.unchanged += 1,
            Upsert::Superseded { previous } => {
                report.superseded += 1;
                warn!(
                    source,
                    test = %observation.test_name,
                    date = %observation.report_date,
                    "value superseded"
                );
                report.notices.push(Diagnostic::ValueConflict {
                    source: source.to_string(),
                    test_name: observation.test_name.clone(),
                    date: observation.report_date,
                    previous: previous.raw_text,
                    current,
                });
            }
        }
    }

    debug!(
        source,
        inserted = report.inserted,
        unchanged = report.unchanged,
        superseded = report.superseded,
        "merged observations"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use labtrend_model::{ObservationValue, TestName};

    fn obs(name: &str, date: (i32, u32, u32), raw: &str, value: f64) -> Observation {
        Observation {
            test_name: TestName::canonical(name).unwrap(),
            value: ObservationValue::Numeric {
                value,
                raw: raw.to_string(),
            },
            unit: Some("mg/dL".to_string()),
            reference_range: None,
            flag: None,
            report_date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
        }
    }

    #[test]
    fn first_merge_inserts() {
        let mut history = TestHistory::new();
        let report = merge_observations(
            &mut history,
            &[obs("Glukoz", (2023, 5, 10), "95", 95.0)],
            "a.html",
        );
        assert_eq!(report.inserted, 1);
        assert!(report.changed());
        assert_eq!(history.observation_count(), 1);
    }

    #[test]
    fn remerge_is_a_noop() {
        let mut history = TestHistory::new();
        let batch = [
            obs("Glukoz", (2023, 5, 10), "95", 95.0),
            obs("Potasyum", (2023, 5, 10), "4,1", 4.1),
        ];
        merge_observations(&mut history, &batch, "a.html");
        let snapshot = history.clone();

        let report = merge_observations(&mut history, &batch, "a.html");
        assert_eq!(report.unchanged, 2);
        assert!(!report.changed());
        assert!(report.notices.is_empty());
        assert_eq!(history, snapshot);
    }

    #[test]
    fn raw_text_difference_is_not_a_conflict() {
        let mut history = TestHistory::new();
        merge_observations(&mut history, &[obs("Potasyum", (2023, 5, 10), "7,2", 7.2)], "a");
        let report =
            merge_observations(&mut history, &[obs("Potasyum", (2023, 5, 10), "7.2", 7.2)], "b");
        assert_eq!(report.unchanged, 1);
    }

    #[test]
    fn differing_value_supersedes_with_notice() {
        let mut history = TestHistory::new();
        merge_observations(&mut history, &[obs("Glukoz", (2023, 5, 10), "95", 95.0)], "a.html");
        let report = merge_observations(
            &mut history,
            &[obs("Glukoz", (2023, 5, 10), "101", 101.0)],
            "b.html",
        );
        assert_eq!(report.superseded, 1);
        let [Diagnostic::ValueConflict {
            source,
            previous,
            current,
            ..
        }] = report.notices.as_slice()
        else {
            panic!("expected one conflict notice");
        };
        assert_eq!(source, "b.html");
        assert_eq!(previous, "95");
        assert_eq!(current, "101");
        assert_eq!(history.observation_count(), 1);
    }

    #[test]
    fn duplicate_within_document_last_wins() {
        let mut history = TestHistory::new();
        let report = merge_observations(
            &mut history,
            &[
                obs("Glukoz", (2023, 5, 10), "95", 95.0),
                obs("Glukoz", (2023, 5, 10), "97", 97.0),
            ],
            "a.html",
        );
        assert_eq!(report.inserted, 1);
        assert_eq!(report.superseded, 0);
        assert_eq!(report.notices.len(), 1);
        let name = TestName::canonical("Glukoz").unwrap();
        assert_eq!(history.entries(&name)[0].raw_text, "97");
    }

    #[test]
    fn collapse_keeps_first_position_and_last_value() {
        let (kept, notices) = collapse_duplicates(
            [
                obs("Glukoz", (2023, 5, 10), "95", 95.0),
                obs("Kreatinin", (2023, 5, 10), "0,8", 0.8),
                obs("Glukoz", (2023, 5, 10), "97", 97.0),
                obs("Glukoz", (2023, 5, 10), "97,0", 97.0),
                obs("Glukoz", (2023, 5, 11), "99", 99.0),
            ],
            "a.html",
        );
        let raw: Vec<&str> = kept.iter().map(|o| o.value.raw_text()).collect();
        assert_eq!(raw, vec!["97", "0,8", "99"]);
        let [Diagnostic::ValueConflict {
            previous, current, ..
        }] = notices.as_slice()
        else {
            panic!("expected one conflict notice");
        };
        assert_eq!(previous, "95");
        assert_eq!(current, "97");
    }

    #[test]
    fn document_with_alternating_duplicates_remerges_cleanly() {
        let mut history = TestHistory::new();
        let batch = [
            obs("Glukoz", (2023, 5, 10), "95", 95.0),
            obs("Glukoz", (2023, 5, 10), "97", 97.0),
            obs("Glukoz", (2023, 5, 10), "95", 95.0),
            obs("Glukoz", (2023, 5, 10), "97", 97.0),
        ];
        merge_observations(&mut history, &batch, "a.html");
        let snapshot = history.clone();

        let report = merge_observations(&mut history, &batch, "a.html");
        assert!(!report.changed());
        assert_eq!(report.unchanged, 1);
        assert_eq!(history, snapshot);
    }

    #[test]
    fn absorb_accumulates() {
        let mut total = MergeReport::default();
        total.absorb(MergeReport {
            inserted: 2,
            unchanged: 1,
            ..MergeReport::default()
        });
        total.absorb(MergeReport {
            superseded: 1,
            ..MergeReport::default()
        });
        assert_eq!(total.total(), 4);
    }
}
