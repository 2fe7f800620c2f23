//! Download settings and validation.
//!
//! Settings are constructed once by the front-end and passed down; nothing
//! in the library reads process-wide configuration.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::DownloadError;
use crate::media::TypeFilter;

/// Default destination directory.
pub const DEFAULT_DESTINATION: &str = "downloads";

/// Default batch size for channel runs.
pub const DEFAULT_BATCH_SIZE: usize = 10;

/// Default batch size for link-list runs.
pub const DEFAULT_LINK_BATCH_SIZE: usize = 5;

/// Upper bound on concurrent transfers per batch.
pub const MAX_BATCH_SIZE: usize = 100;

/// Default number of retry rounds over residual failures.
pub const DEFAULT_MAX_RETRY_ROUNDS: u32 = 3;

/// Default pause before each retry round.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(2);

/// Everything the orchestrator needs to know about a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadSettings {
    /// Directory downloaded files are written to (created if absent).
    pub destination: PathBuf,
    /// Items transferred concurrently per batch.
    pub batch_size: usize,
    /// Retry rounds after the main pass.
    pub max_retry_rounds: u32,
    /// Pause before each retry round.
    pub retry_delay: Duration,
    /// Maximum number of messages to enumerate.
    pub scan_limit: Option<usize>,
    /// Requested media types.
    pub type_filter: TypeFilter,
    /// Directory failure ledgers are written to.
    pub ledger_dir: PathBuf,
    /// Skip items whose file already exists in `destination`.
    pub skip_existing: bool,
}

impl Default for DownloadSettings {
    fn default() -> Self {
        Self {
            destination: PathBuf::from(DEFAULT_DESTINATION),
            batch_size: DEFAULT_BATCH_SIZE,
            max_retry_rounds: DEFAULT_MAX_RETRY_ROUNDS,
            retry_delay: DEFAULT_RETRY_DELAY,
            scan_limit: None,
            type_filter: TypeFilter::all(),
            ledger_dir: PathBuf::from("."),
            skip_existing: false,
        }
    }
}

impl DownloadSettings {
    /// Settings for a channel run.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Settings for a link-list run (smaller default batches).
    #[must_use]
    pub fn for_links() -> Self {
        Self {
            batch_size: DEFAULT_LINK_BATCH_SIZE,
            ..Self::default()
        }
    }

    /// Set the destination directory.
    #[must_use]
    pub fn with_destination(mut self, destination: impl Into<PathBuf>) -> Self {
        self.destination = destination.into();
        self
    }

    /// Set the batch size.
    #[must_use]
    pub const fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Set the number of retry rounds.
    #[must_use]
    pub const fn with_max_retry_rounds(mut self, rounds: u32) -> Self {
        self.max_retry_rounds = rounds;
        self
    }

    /// Set the pause before retry rounds.
    #[must_use]
    pub const fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Set the message scan limit.
    #[must_use]
    pub const fn with_scan_limit(mut self, limit: Option<usize>) -> Self {
        self.scan_limit = limit;
        self
    }

    /// Set the type filter.
    #[must_use]
    pub fn with_type_filter(mut self, filter: TypeFilter) -> Self {
        self.type_filter = filter;
        self
    }

    /// Set the failure-ledger directory.
    #[must_use]
    pub fn with_ledger_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.ledger_dir = dir.into();
        self
    }

    /// Enable or disable skipping of already-downloaded files.
    #[must_use]
    pub const fn with_skip_existing(mut self, skip: bool) -> Self {
        self.skip_existing = skip;
        self
    }

    /// Validate settings values.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.batch_size == 0 || self.batch_size > MAX_BATCH_SIZE {
            return Err(SettingsError::InvalidBatchSize(self.batch_size));
        }
        if self.scan_limit == Some(0) {
            return Err(SettingsError::InvalidScanLimit);
        }
        if self.destination.as_os_str().is_empty() {
            return Err(SettingsError::EmptyDestination);
        }
        Ok(())
    }
}

/// Settings validation error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    #[error("Batch size must be between 1 and {MAX_BATCH_SIZE}, got {0}")]
    InvalidBatchSize(usize),

    #[error("Scan limit must be greater than 0")]
    InvalidScanLimit,

    #[error("Destination directory cannot be empty")]
    EmptyDestination,
}

impl From<SettingsError> for DownloadError {
    fn from(err: SettingsError) -> Self {
        Self::configuration(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = DownloadSettings::new();
        assert_eq!(settings.batch_size, DEFAULT_BATCH_SIZE);
        assert_eq!(settings.max_retry_rounds, 3);
        assert_eq!(settings.destination, PathBuf::from("downloads"));
        assert!(settings.type_filter.is_empty());
        assert!(settings.validate().is_ok());

        assert_eq!(DownloadSettings::for_links().batch_size, DEFAULT_LINK_BATCH_SIZE);
    }

    #[test]
    fn test_builder_pattern() {
        let settings = DownloadSettings::new()
            .with_destination("/tmp/out")
            .with_batch_size(3)
            .with_max_retry_rounds(1)
            .with_retry_delay(Duration::ZERO)
            .with_scan_limit(Some(50))
            .with_type_filter(TypeFilter::parse("video"))
            .with_skip_existing(true);

        assert_eq!(settings.destination, PathBuf::from("/tmp/out"));
        assert_eq!(settings.batch_size, 3);
        assert_eq!(settings.max_retry_rounds, 1);
        assert_eq!(settings.retry_delay, Duration::ZERO);
        assert_eq!(settings.scan_limit, Some(50));
        assert!(settings.skip_existing);
    }

    #[test]
    fn test_validation() {
        assert_eq!(
            DownloadSettings::new().with_batch_size(0).validate(),
            Err(SettingsError::InvalidBatchSize(0))
        );
        assert!(DownloadSettings::new().with_batch_size(101).validate().is_err());
        assert_eq!(
            DownloadSettings::new().with_scan_limit(Some(0)).validate(),
            Err(SettingsError::InvalidScanLimit)
        );
        assert_eq!(
            DownloadSettings::new().with_destination("").validate(),
            Err(SettingsError::EmptyDestination)
        );
    }

    #[test]
    fn test_settings_error_maps_to_configuration() {
        let err: DownloadError = SettingsError::InvalidScanLimit.into();
        assert!(matches!(err, DownloadError::Configuration { .. }));
    }
}
