//! CLI-specific error types and mappings.
//!
//! This module provides error types for the CLI adapter and mappings
//! from `DownloadError` to exit codes and user-facing messages.

use thiserror::Error;
use tgfetch_core::{DownloadError, PathError, ResolutionError};
use tgfetch_export::ExportError;

/// CLI-specific error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Run-level failure that is not covered by a more specific variant.
    #[error("{0}")]
    Core(String),

    /// A channel or message could not be found.
    #[error("{0}")]
    NotFound(String),

    /// Argument or locator error.
    #[error("Invalid arguments: {0}")]
    Arguments(String),

    /// IO error (file not found, permission denied, etc.).
    #[error("IO error: {0}")]
    Io(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The run finished but some items are still missing.
    #[error("{failed} item(s) failed and {not_attempted} were not attempted")]
    Incomplete {
        /// Items that failed every attempt.
        failed: usize,
        /// Items skipped because the run was cancelled.
        not_attempted: usize,
    },

    /// Interrupted by the user.
    #[error("Interrupted")]
    Cancelled,
}

impl CliError {
    /// Map error to appropriate exit code.
    ///
    /// Exit codes follow Unix conventions:
    /// - 0: Success
    /// - 1: General error
    /// - 2: Misuse of shell command (invalid arguments)
    /// - 64-78: Reserved for specific error categories (see sysexits.h)
    /// - 130: Terminated by Ctrl-C
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Core(_) | Self::NotFound(_) | Self::Incomplete { .. } => 1,
            Self::Arguments(_) => 2, // EX_USAGE
            Self::Io(_) => 74,       // EX_IOERR
            Self::Config(_) => 78,   // EX_CONFIG
            Self::Cancelled => 130,
        }
    }
}

impl From<DownloadError> for CliError {
    fn from(err: DownloadError) -> Self {
        match &err {
            DownloadError::Resolution(ResolutionError::EntityNotFound { .. }) => {
                Self::NotFound(err.user_message())
            }
            DownloadError::Resolution(ResolutionError::MalformedLocator { .. }) => {
                Self::Arguments(err.user_message())
            }
            DownloadError::Io { message, .. } => Self::Io(message.clone()),
            DownloadError::Configuration { message } => Self::Config(message.clone()),
            DownloadError::Cancelled => Self::Cancelled,
            DownloadError::Transfer(_) => Self::Core(err.user_message()),
        }
    }
}

impl From<ResolutionError> for CliError {
    fn from(err: ResolutionError) -> Self {
        DownloadError::from(err).into()
    }
}

impl From<ExportError> for CliError {
    fn from(err: ExportError) -> Self {
        match err {
            ExportError::NoExport(_) => Self::Config(err.to_string()),
            ExportError::Read { .. } => Self::Io(err.to_string()),
            ExportError::Parse { .. } => Self::Core(err.to_string()),
        }
    }
}

impl From<PathError> for CliError {
    fn from(err: PathError) -> Self {
        match err {
            PathError::Create { .. } | PathError::NotWritable { .. } => Self::Io(err.to_string()),
            _ => Self::Config(err.to_string()),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_download_error_exit_codes() {
        let not_found: CliError = DownloadError::from(ResolutionError::not_found("nope", 3)).into();
        assert_eq!(not_found.exit_code(), 1);

        let malformed: CliError =
            DownloadError::from(ResolutionError::malformed("t.me/x", "missing message id")).into();
        assert_eq!(malformed.exit_code(), 2);

        let config: CliError = DownloadError::configuration("batch size").into();
        assert_eq!(config.exit_code(), 78);

        let io: CliError = DownloadError::io("NotFound", "gone").into();
        assert_eq!(io.exit_code(), 74);

        assert_eq!(CliError::from(DownloadError::Cancelled).exit_code(), 130);
    }

    #[test]
    fn test_missing_export_is_config_error() {
        let err = CliError::from(ExportError::NoExport("/tmp/none".into()));
        assert_eq!(err.exit_code(), 78);
    }
}
