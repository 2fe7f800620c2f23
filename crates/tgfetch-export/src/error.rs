//! Internal error types for export loading.
//!
//! These errors are internal to `tgfetch-export` and are mapped to the core
//! `TransportError` at the port boundary.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for export operations.
pub type ExportResult<T> = Result<T, ExportError>;

/// Errors raised while loading an export directory.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Neither the root nor any immediate subdirectory holds a `result.json`.
    #[error("No result.json found in {0} or its subdirectories")]
    NoExport(PathBuf),

    /// A file could not be read.
    #[error("Failed to read {path}: {source}")]
    Read {
        /// The file that was read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A `result.json` is not a Telegram Desktop export.
    #[error("Failed to parse {path}: {source}")]
    Parse {
        /// The file that was parsed
        path: PathBuf,
        /// Underlying JSON error
        #[source]
        source: serde_json::Error,
    },
}

impl ExportError {
    /// Create a read error.
    pub fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_export_message() {
        let err = ExportError::NoExport(PathBuf::from("/data/export"));
        assert!(err.to_string().contains("/data/export"));
    }

    #[test]
    fn test_read_error_keeps_source() {
        let err = ExportError::read(
            "/data/export/result.json",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(err.to_string().contains("denied"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
