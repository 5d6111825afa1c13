//! Store loading.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use labtrend_model::{AccumulatedStore, StoreScope};
use tracing::{info, warn};

use crate::error::{Result, StoreError};
use crate::format::from_json;

/// Loads the store at `path`, or an empty store when the file does not exist.
///
/// A file that exists but cannot be parsed is an error; it is never replaced.
pub fn load_store(path: &Path, scope: StoreScope) -> Result<AccumulatedStore> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            info!(path = %path.display(), "no existing store, starting empty");
            return Ok(AccumulatedStore::new(scope));
        }
        Err(err) => {
            return Err(StoreError::Io {
                operation: "read",
                path: path.to_path_buf(),
                source: err,
            });
        }
    };

    let decoded = from_json(&text, scope).map_err(|source| StoreError::Malformed {
        path: path.to_path_buf(),
        source,
    })?;
    if decoded.repaired > 0 {
        warn!(
            path = %path.display(),
            dropped = decoded.repaired,
            "store had duplicate dates; kept the last entry of each"
        );
    }

    info!(
        path = %path.display(),
        observations = decoded.store.observation_count(),
        "loaded store"
    );
    Ok(decoded.store)
}
