//! Error types for report ingestion.

use std::path::PathBuf;
use thiserror::Error;

/// Failures to locate or read report files.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("report directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    #[error("cannot list report directory {path}: {source}")]
    DirectoryRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot read report {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, IngestError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = IngestError::DirectoryNotFound {
            path: PathBuf::from("/path/to/reports"),
        };
        assert_eq!(err.to_string(), "report directory not found: /path/to/reports");
    }
}
