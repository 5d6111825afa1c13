//! Store saving.

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use labtrend_model::AccumulatedStore;
use tracing::info;

use crate::error::{Result, StoreError};
use crate::format::to_json;

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("store"));
    name.push(".tmp");
    path.with_file_name(name)
}

/// Writes the store to `path`.
///
/// Uses atomic write (temp file + rename) so a crash never leaves a
/// half-written record behind.
pub fn save_store(store: &AccumulatedStore, path: &Path) -> Result<()> {
    let text = to_json(store).map_err(|source| StoreError::Serialization { source })?;
    let temp_path = temp_path_for(path);

    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| StoreError::Io {
            operation: "create directory",
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    let mut file = File::create(&temp_path).map_err(|e| StoreError::Io {
        operation: "create",
        path: temp_path.clone(),
        source: e,
    })?;

    file.write_all(text.as_bytes()).map_err(|e| StoreError::Io {
        operation: "write",
        path: temp_path.clone(),
        source: e,
    })?;

    file.sync_all().map_err(|e| StoreError::Io {
        operation: "sync",
        path: temp_path.clone(),
        source: e,
    })?;

    fs::rename(&temp_path, path).map_err(|e| StoreError::AtomicWriteFailed {
        temp_path: temp_path.clone(),
        target_path: path.to_path_buf(),
        source: e,
    })?;

    info!(
        path = %path.display(),
        observations = store.observation_count(),
        "saved store"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use labtrend_model::StoreScope;
    use tempfile::tempdir;

    #[test]
    fn test_save_creates_parent_and_leaves_no_temp_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("data.json");

        save_store(&AccumulatedStore::new(StoreScope::Single), &path).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "{}\n");
        assert!(!temp_path_for(&path).exists());
    }

    #[test]
    fn test_temp_path_keeps_file_name() {
        let temp = temp_path_for(Path::new("/data/history.json"));
        assert_eq!(temp, PathBuf::from("/data/history.json.tmp"));
    }
}
