//! Error taxonomy for resolution and transfer.
//!
//! These errors are designed to be serializable and not depend on external
//! error types like `std::io::Error`. For I/O errors, we capture the kind
//! and message as strings.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure to turn a locator into an addressable channel.
#[derive(Clone, Debug, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum ResolutionError {
    /// Every applicable encoding was tried and none was known to the transport.
    #[error("Entity not found for '{locator}' after {attempts} attempt(s)")]
    EntityNotFound {
        /// The locator as supplied by the user.
        locator: String,
        /// Number of candidate encodings tried.
        attempts: usize,
    },

    /// The locator is missing a segment the requested operation needs.
    #[error("Malformed locator '{locator}': {reason}")]
    MalformedLocator {
        /// The locator as supplied by the user.
        locator: String,
        /// What is missing or invalid.
        reason: String,
    },
}

impl ResolutionError {
    /// Create an entity-not-found error.
    pub fn not_found(locator: impl Into<String>, attempts: usize) -> Self {
        Self::EntityNotFound {
            locator: locator.into(),
            attempts,
        }
    }

    /// Create a malformed-locator error.
    pub fn malformed(locator: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedLocator {
            locator: locator.into(),
            reason: reason.into(),
        }
    }
}

/// Failure of a single item transfer.
///
/// Always caught at the item boundary and recorded in the failed ledger.
#[derive(Clone, Debug, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum TransferError {
    /// The transport failed while fetching or transferring the item.
    #[error("Transfer failed: {reason}")]
    TransportFailure {
        /// Message the failure belongs to, when known.
        #[serde(skip_serializing_if = "Option::is_none")]
        message_id: Option<i64>,
        /// Transport-provided reason.
        reason: String,
    },

    /// The item exists but carries no media accepted by the type filter.
    #[error("Message {message_id} has no matching media (detected: {detected})")]
    NoMatchingMedia {
        /// Message that was inspected.
        message_id: i64,
        /// Detected media type, or `none` when the message has no media.
        detected: String,
    },
}

impl TransferError {
    /// Create a transport failure for a known message.
    pub fn transport(message_id: i64, reason: impl Into<String>) -> Self {
        Self::TransportFailure {
            message_id: Some(message_id),
            reason: reason.into(),
        }
    }

    /// Create a transport failure that happened before a message was known.
    pub fn transport_unbound(reason: impl Into<String>) -> Self {
        Self::TransportFailure {
            message_id: None,
            reason: reason.into(),
        }
    }

    /// Create a no-matching-media error.
    pub fn no_matching_media(message_id: i64, detected: impl Into<String>) -> Self {
        Self::NoMatchingMedia {
            message_id,
            detected: detected.into(),
        }
    }

    /// Whether another attempt could succeed.
    ///
    /// A message without matching media stays that way; only transport
    /// failures are worth a retry round.
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::TransportFailure { .. })
    }
}

/// Error type for run-level download operations.
///
/// Per-item problems never surface here; they are recorded as outcomes.
#[derive(Clone, Debug, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum DownloadError {
    /// The channel or message locator could not be resolved.
    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    /// A transfer-level error that aborts the operation (e.g. enumeration).
    #[error(transparent)]
    Transfer(#[from] TransferError),

    /// I/O error during file operations.
    #[error("I/O error ({kind}): {message}")]
    Io {
        /// The kind of I/O error (e.g., "not found", "permission denied").
        kind: String,
        /// Detailed error message.
        message: String,
    },

    /// Invalid settings were supplied.
    #[error("Configuration error: {message}")]
    Configuration {
        /// Detailed error message.
        message: String,
    },

    /// The run was cancelled before it could start.
    #[error("Download cancelled")]
    Cancelled,
}

impl DownloadError {
    /// Create an I/O error from kind and message strings.
    pub fn io(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Io {
            kind: kind.into(),
            message: message.into(),
        }
    }

    /// Create an I/O error from a `std::io::Error`.
    ///
    /// This captures the error kind name and message for serialization.
    #[must_use]
    pub fn from_io_error(err: &std::io::Error) -> Self {
        let kind = err.kind();
        Self::Io {
            kind: format!("{kind:?}"),
            message: err.to_string(),
        }
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Check if retrying the whole operation could help.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Transfer(TransferError::TransportFailure { .. }) | Self::Io { .. }
        )
    }

    /// Check if this is a cancellation.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Convert to a user-friendly message.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Resolution(ResolutionError::EntityNotFound { locator, .. }) => {
                format!("Could not find channel: {locator}")
            }
            Self::Resolution(ResolutionError::MalformedLocator { locator, reason }) => {
                format!("Could not understand '{locator}': {reason}")
            }
            Self::Transfer(TransferError::TransportFailure { reason, .. }) => {
                format!("Transfer failed: {reason}")
            }
            Self::Transfer(TransferError::NoMatchingMedia { message_id, detected }) => {
                format!("Message {message_id} has nothing to download (media: {detected})")
            }
            Self::Io { message, .. } => format!("File operation failed: {message}"),
            Self::Configuration { message } => format!("Invalid configuration: {message}"),
            Self::Cancelled => "Download was cancelled.".to_string(),
        }
    }
}

/// Convenience result type for download operations.
pub type DownloadResult<T> = Result<T, DownloadError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_from_std() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = DownloadError::from_io_error(&io_err);

        match err {
            DownloadError::Io { kind, message } => {
                assert_eq!(kind, "NotFound");
                assert!(message.contains("file not found"));
            }
            _ => panic!("Expected Io variant"),
        }
    }

    #[test]
    fn test_error_serialization() {
        let err = DownloadError::from(TransferError::transport(42, "flood wait"));
        let json = serde_json::to_string(&err).unwrap();
        assert!(json.contains("flood wait"));
        assert!(json.contains("42"));

        let parsed: DownloadError = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, err);
    }

    #[test]
    fn test_only_transport_failures_are_retryable() {
        assert!(TransferError::transport(3, "timeout").is_retryable());
        assert!(TransferError::transport_unbound("flood wait").is_retryable());
        assert!(!TransferError::no_matching_media(3, "photo").is_retryable());
    }

    #[test]
    fn test_is_recoverable() {
        assert!(DownloadError::from(TransferError::transport(1, "timeout")).is_recoverable());
        assert!(DownloadError::io("Other", "disk hiccup").is_recoverable());
        assert!(!DownloadError::Cancelled.is_recoverable());
        assert!(!DownloadError::from(ResolutionError::not_found("@nobody", 1)).is_recoverable());
    }

    #[test]
    fn test_user_messages() {
        let err = DownloadError::from(ResolutionError::not_found("examplechan", 3));
        assert!(err.user_message().contains("examplechan"));

        let err = DownloadError::from(TransferError::no_matching_media(7, "none"));
        assert!(err.user_message().contains('7'));
    }
}
