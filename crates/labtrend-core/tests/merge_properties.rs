//! Property tests for history merging.

use chrono::{Days, NaiveDate};
use labtrend_core::merge_observations;
use labtrend_model::{Observation, ObservationValue, TestHistory, TestName};
use proptest::prelude::*;

const TESTS: &[&str] = &["Glukoz", "Kreatinin", "Potasyum", "ALT", "Hemoglobin"];

/// One extracted document: a distinct report date and its results.
#[derive(Debug, Clone)]
struct Doc {
    source: String,
    observations: Vec<Observation>,
}

fn observation(test: usize, tenths: u32, date: NaiveDate) -> Observation {
    let value = f64::from(tenths) / 10.0;
    Observation {
        test_name: TestName::canonical(TESTS[test]).unwrap(),
        value: ObservationValue::Numeric {
            value,
            raw: value.to_string().replace('.', ","),
        },
        unit: None,
        reference_range: None,
        flag: None,
        report_date: date,
    }
}

fn docs_strategy() -> impl Strategy<Value = Vec<Doc>> {
    proptest::collection::vec(
        proptest::collection::vec((0..TESTS.len(), 0u32..5000), 1..8),
        1..6,
    )
    .prop_map(|docs| {
        let base = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        docs.into_iter()
            .enumerate()
            .map(|(idx, rows)| {
                let date = base + Days::new(idx as u64 * 17);
                Doc {
                    source: format!("report-{idx}.html"),
                    observations: rows
                        .into_iter()
                        .map(|(test, tenths)| observation(test, tenths, date))
                        .collect(),
                }
            })
            .collect()
    })
}

fn merge_all<'a>(docs: impl IntoIterator<Item = &'a Doc>) -> TestHistory {
    let mut history = TestHistory::new();
    for doc in docs {
        merge_observations(&mut history, &doc.observations, &doc.source);
    }
    history
}

proptest! {
    #[test]
    fn merging_twice_equals_merging_once(docs in docs_strategy()) {
        let once = merge_all(&docs);
        let mut twice = once.clone();
        for doc in &docs {
            let report = merge_observations(&mut twice, &doc.observations, &doc.source);
            prop_assert!(!report.changed());
            prop_assert_eq!(report.superseded, 0);
        }
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn merge_order_does_not_matter(
        (docs, order) in docs_strategy().prop_flat_map(|docs| {
            let order: Vec<usize> = (0..docs.len()).collect();
            (Just(docs), Just(order).prop_shuffle())
        })
    ) {
        let forward = merge_all(&docs);
        let shuffled = merge_all(order.iter().map(|&idx| &docs[idx]));
        prop_assert_eq!(forward, shuffled);
    }

    #[test]
    fn histories_stay_ordered_and_unique(docs in docs_strategy()) {
        let history = merge_all(docs.iter().rev());
        prop_assert!(history.is_well_formed());
        for (_, entries) in history.iter() {
            for pair in entries.windows(2) {
                prop_assert!(pair[0].date < pair[1].date);
            }
        }
    }
}

#[test]
fn later_document_first_still_sorts() {
    let jan = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
    let feb = NaiveDate::from_ymd_opt(2023, 2, 1).unwrap();
    let d1 = Doc {
        source: "d1".to_string(),
        observations: vec![observation(0, 950, jan)],
    };
    let d2 = Doc {
        source: "d2".to_string(),
        observations: vec![observation(0, 1010, feb)],
    };

    let forward = merge_all([&d1, &d2]);
    let backward = merge_all([&d2, &d1]);
    assert_eq!(forward, backward);

    let glucose = TestName::canonical("Glukoz").unwrap();
    let dates: Vec<NaiveDate> = forward.entries(&glucose).iter().map(|e| e.date).collect();
    assert_eq!(dates, vec![jan, feb]);
}
