//! Transport port definitions (trait abstractions).
//!
//! The transport owns the session, entity cache, message enumeration and
//! byte transfer. Everything that decides *what* to fetch lives outside it.

use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::media::RemoteMessage;
use crate::reference::CanonicalReference;

/// Progress callback: `(bytes_done, bytes_total)`.
pub type ProgressCallback = Box<dyn Fn(u64, u64) + Send + Sync>;

/// Who the session is connected as.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionInfo {
    /// Human-readable name of the account or source.
    pub display_name: String,
}

/// A channel, group or chat the transport can enumerate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityHandle {
    /// Transport-side identifier.
    pub id: i64,
    /// Display title.
    pub title: String,
    /// Public username, when the entity has one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

impl EntityHandle {
    /// Create a handle without a username.
    pub fn new(id: i64, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            username: None,
        }
    }
}

/// Errors raised by a transport implementation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// Entity or message unknown to the transport.
    #[error("Not found: {what}")]
    NotFound {
        /// What was looked up.
        what: String,
    },

    /// The media exists but cannot be retrieved right now.
    #[error("Unavailable: {message}")]
    Unavailable {
        /// Detailed error message.
        message: String,
    },

    /// Local I/O failed while writing the destination.
    #[error("I/O error: {message}")]
    Io {
        /// Detailed error message.
        message: String,
    },

    /// Anything else.
    #[error("{message}")]
    Other {
        /// Detailed error message.
        message: String,
    },
}

impl TransportError {
    /// Create a not-found error.
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound { what: what.into() }
    }

    /// Create an unavailable error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Create an I/O error.
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Create a generic error.
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }

    /// Check if this is a not-found error.
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl From<std::io::Error> for TransportError {
    fn from(err: std::io::Error) -> Self {
        Self::io(err.to_string())
    }
}

/// Narrow contract to the remote service.
///
/// # Usage
///
/// ```ignore
/// let transport: Arc<dyn MediaTransport> = /* ... */;
/// let entity = transport.resolve_entity(&CanonicalReference::Username("chan".into())).await?;
/// let messages = transport.enumerate_messages(&entity, Some(100)).await?;
/// ```
#[async_trait]
pub trait MediaTransport: Send + Sync {
    /// Establish (or reuse) the session.
    async fn connect(&self) -> Result<SessionInfo, TransportError>;

    /// Look up one encoding of an entity.
    async fn resolve_entity(
        &self,
        candidate: &CanonicalReference,
    ) -> Result<EntityHandle, TransportError>;

    /// Enumerate up to `limit` messages, in transport-defined order.
    async fn enumerate_messages(
        &self,
        entity: &EntityHandle,
        limit: Option<usize>,
    ) -> Result<Vec<RemoteMessage>, TransportError>;

    /// Fetch a single message by ID.
    async fn fetch_message(
        &self,
        entity: &EntityHandle,
        message_id: i64,
    ) -> Result<RemoteMessage, TransportError>;

    /// Write the message's media to `destination`, returning bytes written.
    async fn transfer_media(
        &self,
        message: &RemoteMessage,
        destination: &Path,
        progress: Option<ProgressCallback>,
    ) -> Result<u64, TransportError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_errors_map_to_io_variant() {
        let err = TransportError::from(std::io::Error::other("disk full"));
        assert!(matches!(err, TransportError::Io { .. }));
        assert!(!err.is_not_found());
        assert!(TransportError::not_found("chan").is_not_found());
    }
}
