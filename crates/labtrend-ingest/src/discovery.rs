//! Report file discovery.

use std::path::{Path, PathBuf};

use crate::error::{IngestError, Result};

/// File extensions accepted as rendered reports.
pub const REPORT_EXTENSIONS: &[&str] = &["html", "htm", "txt", "csv"];

/// Lists all report files in a directory.
///
/// Returns files sorted by filename. Subdirectories are not descended into.
pub fn list_report_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(IngestError::DirectoryNotFound {
            path: dir.to_path_buf(),
        });
    }

    let mut files = Vec::new();

    let entries = std::fs::read_dir(dir).map_err(|e| IngestError::DirectoryRead {
        path: dir.to_path_buf(),
        source: e,
    })?;

    for entry_result in entries {
        let entry = entry_result.map_err(|e| IngestError::DirectoryRead {
            path: dir.to_path_buf(),
            source: e,
        })?;

        let path = entry.path();
        if !path.is_file() {
            continue;
        }

        let is_report = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                REPORT_EXTENSIONS
                    .iter()
                    .any(|known| ext.eq_ignore_ascii_case(known))
            })
            .unwrap_or(false);

        if is_report {
            files.push(path);
        }
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    Ok(files)
}

/// Reads a report file into memory.
pub fn read_report(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).map_err(|e| IngestError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Display name used as a document's source identifier.
pub fn source_name(path: &Path) -> String {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(str::to_string)
        .unwrap_or_else(|| path.display().to_string())
}
