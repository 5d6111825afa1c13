//! JSON form of the accumulated store.
//!
//! Single scope writes the history itself:
//!
//! ```text
//! { "<test>": [ { "date": "2023-05-10", "value": 95.0, ... } ] }
//! ```
//!
//! Per-patient scope nests one level deeper, keyed by patient identifier.
//! Keys are sorted, the output is pretty-printed with a trailing newline, so
//! serializing an unchanged store always produces the same bytes.

use std::collections::BTreeMap;

use labtrend_model::{AccumulatedStore, StoreScope, TestHistory};

use serde_json::Error;

/// A store read from JSON, with the number of duplicate entries dropped while
/// restoring ordering and uniqueness.
#[derive(Debug)]
pub struct Decoded {
    pub store: AccumulatedStore,
    pub repaired: usize,
}

/// Serializes the store to its persisted text.
pub fn to_json(store: &AccumulatedStore) -> Result<String, Error> {
    let mut text = match store.scope() {
        StoreScope::Single => match store.history(None) {
            Some(history) => serde_json::to_string_pretty(history)?,
            None => serde_json::to_string_pretty(&TestHistory::new())?,
        },
        StoreScope::PerPatient => {
            let nested: BTreeMap<&str, &TestHistory> = store.histories().collect();
            serde_json::to_string_pretty(&nested)?
        }
    };
    text.push('\n');
    Ok(text)
}

/// Parses persisted text written in `scope`.
pub fn from_json(text: &str, scope: StoreScope) -> Result<Decoded, Error> {
    let mut repaired = 0;
    let store = match scope {
        StoreScope::Single => {
            let mut history: TestHistory = serde_json::from_str(text)?;
            repaired += history.repair();
            AccumulatedStore::single(history)
        }
        StoreScope::PerPatient => {
            let nested: BTreeMap<String, TestHistory> = serde_json::from_str(text)?;
            let mut store = AccumulatedStore::new(StoreScope::PerPatient);
            for (patient, mut history) in nested {
                repaired += history.repair();
                store.insert_history(&patient, history);
            }
            store
        }
    };
    Ok(Decoded { store, repaired })
}
