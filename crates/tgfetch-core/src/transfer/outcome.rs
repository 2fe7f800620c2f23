//! Per-item transfer outcomes.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::errors::TransferError;
use crate::media::MediaItem;

/// One unit of work for a batch or retry round.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TransferJob {
    /// An enumerated item; `link` is its message link for the failure ledger.
    Item {
        /// The classified item.
        item: MediaItem,
        /// Message link that re-resolves to this item.
        link: String,
    },
    /// A message link that still has to be resolved and fetched.
    Link {
        /// The link as supplied.
        link: String,
    },
}

impl TransferJob {
    /// Create a job for an enumerated item.
    pub fn item(item: MediaItem, link: impl Into<String>) -> Self {
        Self::Item {
            item,
            link: link.into(),
        }
    }

    /// Create a job for a message link.
    pub fn link(link: impl Into<String>) -> Self {
        Self::Link { link: link.into() }
    }

    /// The locator written to the failure ledger.
    pub fn locator(&self) -> &str {
        match self {
            Self::Item { link, .. } | Self::Link { link } => link,
        }
    }

    /// The message ID, when already known.
    pub const fn message_id(&self) -> Option<i64> {
        match self {
            Self::Item { item, .. } => Some(item.id()),
            Self::Link { .. } => None,
        }
    }
}

/// Successful result of a transfer strategy.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transferred {
    /// Where the file lives locally.
    pub path: PathBuf,
    /// True when an existing file was found and nothing was transferred.
    pub already_present: bool,
}

impl Transferred {
    /// A freshly downloaded file.
    pub const fn downloaded(path: PathBuf) -> Self {
        Self {
            path,
            already_present: false,
        }
    }

    /// A file that was already on disk.
    pub const fn existing(path: PathBuf) -> Self {
        Self {
            path,
            already_present: true,
        }
    }
}

/// Final status of one attempt.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "error", rename_all = "snake_case")]
pub enum TransferStatus {
    /// Bytes were transferred.
    Transferred,
    /// A matching file already existed locally.
    AlreadyPresent,
    /// The attempt failed.
    Failed(TransferError),
}

impl TransferStatus {
    /// Whether this counts towards the succeeded ledger.
    pub const fn is_success(&self) -> bool {
        !matches!(self, Self::Failed(_))
    }
}

/// Result of attempting one job.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferOutcome {
    /// The job that was attempted (updated with the fetched item for links).
    pub job: TransferJob,
    /// What happened.
    pub status: TransferStatus,
    /// Local file, on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_path: Option<PathBuf>,
    /// How many times this job has been attempted in the run.
    pub attempts: u32,
}

impl TransferOutcome {
    /// Build an outcome from a strategy result.
    pub fn from_result(job: TransferJob, result: Result<Transferred, TransferError>) -> Self {
        match result {
            Ok(done) => Self {
                job,
                status: if done.already_present {
                    TransferStatus::AlreadyPresent
                } else {
                    TransferStatus::Transferred
                },
                local_path: Some(done.path),
                attempts: 1,
            },
            Err(err) => Self::failed(job, err),
        }
    }

    /// Build a failed outcome.
    pub const fn failed(job: TransferJob, error: TransferError) -> Self {
        Self {
            job,
            status: TransferStatus::Failed(error),
            local_path: None,
            attempts: 1,
        }
    }

    /// Whether the attempt succeeded.
    pub const fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// The failure, if any.
    pub const fn error(&self) -> Option<&TransferError> {
        match &self.status {
            TransferStatus::Failed(err) => Some(err),
            _ => None,
        }
    }

    /// Whether this is a failure another attempt could fix.
    pub const fn is_retryable(&self) -> bool {
        match self.error() {
            Some(err) => err.is_retryable(),
            None => false,
        }
    }

    /// Message ID of the outcome, falling back to the one in the error.
    pub fn message_id(&self) -> Option<i64> {
        self.job.message_id().or_else(|| match self.error() {
            Some(TransferError::TransportFailure { message_id, .. }) => *message_id,
            Some(TransferError::NoMatchingMedia { message_id, .. }) => Some(*message_id),
            None => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::{MediaPayload, RemoteMessage};

    fn photo_job(id: i64) -> TransferJob {
        let item =
            MediaItem::classify(RemoteMessage::with_media(id, MediaPayload::Photo { size: None }))
                .unwrap();
        TransferJob::item(item, format!("https://t.me/chan/{id}"))
    }

    #[test]
    fn outcome_from_existing_file() {
        let outcome = TransferOutcome::from_result(
            photo_job(4),
            Ok(Transferred::existing(PathBuf::from("x/20240101_000000_4.jpg"))),
        );
        assert_eq!(outcome.status, TransferStatus::AlreadyPresent);
        assert!(outcome.is_success());
        assert_eq!(outcome.message_id(), Some(4));
    }

    #[test]
    fn failed_link_outcome_takes_id_from_error() {
        let outcome = TransferOutcome::failed(
            TransferJob::link("https://t.me/chan/8"),
            TransferError::no_matching_media(8, "none"),
        );
        assert!(!outcome.is_success());
        assert_eq!(outcome.message_id(), Some(8));
        assert_eq!(outcome.job.locator(), "https://t.me/chan/8");
        assert_eq!(outcome.local_path, None);
    }
}
