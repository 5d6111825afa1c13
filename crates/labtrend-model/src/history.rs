//! Accumulated per-test histories.
//!
//! A [`TestHistory`] maps each test name to its results ordered by date.
//! Two invariants hold after every mutation made through this API:
//!
//! - entries of one test are sorted ascending by `date`
//! - no two entries of one test share a `date`

use std::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::observation::{Flag, ReferenceRange, TestName};

/// Persisted value: a JSON number or a JSON string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntryValue {
    Number(f64),
    Text(String),
}

/// One persisted result record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub date: NaiveDate,
    pub value: EntryValue,
    pub unit: Option<String>,
    pub reference_range: Option<ReferenceRange>,
    pub flag: Option<Flag>,
    pub raw_text: String,
}

impl HistoryEntry {
    /// Semantic equality used by the merge rule.
    ///
    /// `raw_text` is ignored: "7,2" and "7.2" are the same result.
    pub fn same_result(&self, other: &Self) -> bool {
        self.value == other.value
            && self.unit == other.unit
            && self.reference_range == other.reference_range
            && self.flag == other.flag
    }
}

/// Outcome of [`TestHistory::upsert`].
#[derive(Debug, Clone, PartialEq)]
pub enum Upsert {
    /// No entry existed for the `(test, date)` key.
    Inserted,
    /// An equal entry already existed; nothing changed.
    Unchanged,
    /// A different entry existed and was replaced.
    Superseded { previous: HistoryEntry },
}

/// Chronological results per test name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TestHistory {
    tests: BTreeMap<TestName, Vec<HistoryEntry>>,
}

impl TestHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.tests.is_empty()
    }

    pub fn test_count(&self) -> usize {
        self.tests.len()
    }

    pub fn observation_count(&self) -> usize {
        self.tests.values().map(Vec::len).sum()
    }

    /// Entries for a test, ascending by date.
    pub fn entries(&self, test: &TestName) -> &[HistoryEntry] {
        self.tests.get(test).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn entry_on(&self, test: &TestName, date: NaiveDate) -> Option<&HistoryEntry> {
        let entries = self.entries(test);
        entries
            .binary_search_by(|entry| entry.date.cmp(&date))
            .ok()
            .map(|idx| &entries[idx])
    }

    /// Iterates tests in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&TestName, &[HistoryEntry])> {
        self.tests
            .iter()
            .map(|(name, entries)| (name, entries.as_slice()))
    }

    /// Inserts or replaces the entry for `(test, entry.date)`.
    ///
    /// Uses binary insertion so the sequence is ordered without a re-sort.
    pub fn upsert(&mut self, test: TestName, entry: HistoryEntry) -> Upsert {
        let entries = self.tests.entry(test).or_default();
        match entries.binary_search_by(|existing| existing.date.cmp(&entry.date)) {
            Ok(idx) => {
                if entries[idx].same_result(&entry) {
                    Upsert::Unchanged
                } else {
                    let previous = std::mem::replace(&mut entries[idx], entry);
                    Upsert::Superseded { previous }
                }
            }
            Err(idx) => {
                entries.insert(idx, entry);
                Upsert::Inserted
            }
        }
    }

    /// Returns true when both ordering and uniqueness invariants hold.
    pub fn is_well_formed(&self) -> bool {
        self.tests.values().all(|entries| {
            entries
                .windows(2)
                .all(|pair| pair[0].date.cmp(&pair[1].date) == Ordering::Less)
        })
    }

    /// Restores the invariants on data that did not come through [`upsert`].
    ///
    /// Entries are stably sorted by date; for duplicate dates the last one wins.
    /// Returns the number of entries dropped as duplicates.
    ///
    /// [`upsert`]: TestHistory::upsert
    pub fn repair(&mut self) -> usize {
        let mut dropped = 0;
        for entries in self.tests.values_mut() {
            entries.sort_by(|a, b| a.date.cmp(&b.date));
            let before = entries.len();
            let mut kept: Vec<HistoryEntry> = Vec::with_capacity(before);
            for entry in entries.drain(..) {
                match kept.last_mut() {
                    Some(last) if last.date == entry.date => *last = entry,
                    _ => kept.push(entry),
                }
            }
            dropped += before - kept.len();
            *entries = kept;
        }
        self.tests.retain(|_, entries| !entries.is_empty());
        dropped
    }
}

/// How the accumulated store is keyed on disk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreScope {
    /// The record is a single [`TestHistory`].
    #[default]
    Single,
    /// The record maps patient identifiers to histories.
    PerPatient,
}

/// Key used for the only history of a single-patient store.
pub const DEFAULT_PATIENT: &str = "default";

/// Everything persisted across runs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AccumulatedStore {
    scope: StoreScope,
    histories: BTreeMap<String, TestHistory>,
}

impl AccumulatedStore {
    pub fn new(scope: StoreScope) -> Self {
        Self {
            scope,
            histories: BTreeMap::new(),
        }
    }

    pub fn single(history: TestHistory) -> Self {
        let mut store = Self::new(StoreScope::Single);
        store
            .histories
            .insert(DEFAULT_PATIENT.to_string(), history);
        store
    }

    pub fn scope(&self) -> StoreScope {
        self.scope
    }

    fn key_for(&self, patient: Option<&str>) -> String {
        match (self.scope, patient) {
            (StoreScope::PerPatient, Some(id)) if !id.trim().is_empty() => id.trim().to_string(),
            _ => DEFAULT_PATIENT.to_string(),
        }
    }

    /// History for a patient; single-scope stores ignore the identifier.
    pub fn history(&self, patient: Option<&str>) -> Option<&TestHistory> {
        self.histories.get(&self.key_for(patient))
    }

    /// Mutable history for a patient, created empty on first use.
    pub fn history_mut(&mut self, patient: Option<&str>) -> &mut TestHistory {
        let key = self.key_for(patient);
        self.histories.entry(key).or_default()
    }

    pub fn insert_history(&mut self, patient: &str, history: TestHistory) {
        let key = self.key_for(Some(patient));
        self.histories.insert(key, history);
    }

    /// Iterates `(patient, history)` pairs in key order.
    pub fn histories(&self) -> impl Iterator<Item = (&str, &TestHistory)> {
        self.histories
            .iter()
            .map(|(key, history)| (key.as_str(), history))
    }

    pub fn observation_count(&self) -> usize {
        self.histories
            .values()
            .map(TestHistory::observation_count)
            .sum()
    }
}
