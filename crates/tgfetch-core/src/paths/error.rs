//! Destination directory errors.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Why a destination directory cannot be used.
#[derive(Debug, Error)]
pub enum PathError {
    #[error("{0} exists but is not a directory")]
    NotADirectory(PathBuf),

    #[error("Directory {0} does not exist")]
    Missing(PathBuf),

    #[error("Failed to create directory {path}: {source}")]
    Create {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Directory {path} is not writable: {source}")]
    NotWritable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Destination path cannot be empty")]
    Empty,
}

impl From<PathError> for crate::errors::DownloadError {
    fn from(err: PathError) -> Self {
        match &err {
            PathError::Create { source, .. } | PathError::NotWritable { source, .. } => {
                Self::io(format!("{:?}", source.kind()), err.to_string())
            }
            _ => Self::configuration(err.to_string()),
        }
    }
}
