//! Persisted record shape and re-save stability.

use std::fs;

use chrono::NaiveDate;
use labtrend_model::{
    AccumulatedStore, EntryValue, Flag, HistoryEntry, ReferenceRange, StoreScope, TestHistory,
    TestName,
};
use labtrend_store::{load_store, save_store, to_json};

fn may_10() -> NaiveDate {
    NaiveDate::from_ymd_opt(2023, 5, 10).unwrap()
}

fn sample_history() -> TestHistory {
    let mut history = TestHistory::new();
    history.upsert(
        TestName::canonical("Potasyum").unwrap(),
        HistoryEntry {
            date: may_10(),
            value: EntryValue::Number(7.2),
            unit: Some("mmol/L".to_string()),
            reference_range: Some(ReferenceRange::Between { low: 3.5, high: 5.1 }),
            flag: Some(Flag::High),
            raw_text: "7,2".to_string(),
        },
    );
    history.upsert(
        TestName::canonical("HBsAg").unwrap(),
        HistoryEntry {
            date: may_10(),
            value: EntryValue::Text("Negatif".to_string()),
            unit: None,
            reference_range: Some(ReferenceRange::Text {
                text: "Negatif".to_string(),
            }),
            flag: Some(Flag::Normal),
            raw_text: "Negatif".to_string(),
        },
    );
    history
}

#[test]
fn single_scope_record_shape() {
    let store = AccumulatedStore::single(sample_history());
    insta::assert_snapshot!(to_json(&store).unwrap(), @r#"
    {
      "HBsAg": [
        {
          "date": "2023-05-10",
          "value": "Negatif",
          "unit": null,
          "reference_range": {
            "kind": "text",
            "text": "Negatif"
          },
          "flag": "normal",
          "raw_text": "Negatif"
        }
      ],
      "Potasyum": [
        {
          "date": "2023-05-10",
          "value": 7.2,
          "unit": "mmol/L",
          "reference_range": {
            "kind": "between",
            "low": 3.5,
            "high": 5.1
          },
          "flag": "high",
          "raw_text": "7,2"
        }
      ]
    }
    "#);
}

#[test]
fn resaving_a_loaded_store_is_byte_identical() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data.json");

    save_store(&AccumulatedStore::single(sample_history()), &path).unwrap();
    let first = fs::read(&path).unwrap();

    let loaded = load_store(&path, StoreScope::Single).unwrap();
    assert_eq!(loaded.history(None), Some(&sample_history()));
    save_store(&loaded, &path).unwrap();
    assert_eq!(fs::read(&path).unwrap(), first);
}

#[test]
fn per_patient_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("patients.json");

    let mut store = AccumulatedStore::new(StoreScope::PerPatient);
    store.insert_history("patient-7", sample_history());
    save_store(&store, &path).unwrap();

    let text = fs::read_to_string(&path).unwrap();
    assert!(text.starts_with("{\n  \"patient-7\": {\n    \"HBsAg\": ["));

    let loaded = load_store(&path, StoreScope::PerPatient).unwrap();
    assert_eq!(loaded, store);
}
