//! Outcome ledgers and locator files.
//!
//! A [`RunLedger`] is the in-memory record of one run. Failures that
//! survive retry rounds are written as a plain text locator file (one
//! link per line) that a later run accepts as input.

use std::path::{Path, PathBuf};

use chrono::Local;
use tgfetch_core::errors::DownloadError;
use tgfetch_core::media::CAPTURE_TIMESTAMP_FORMAT;
use tgfetch_core::transfer::{RunSummary, TransferJob, TransferOutcome, TransferStatus};
use tokio::io::AsyncWriteExt;
use tracing::info;

/// File name prefix of failure ledgers.
pub const FAILURE_LEDGER_PREFIX: &str = "failed_links_";

/// File name prefix of extracted media-link lists.
pub const MEDIA_LINKS_PREFIX: &str = "media_links_";

/// Outcomes of one run, partitioned by status.
///
/// Only the orchestrator's join points mutate a ledger, so an outcome is
/// always in exactly one of the lists.
#[derive(Debug, Clone, Default)]
pub struct RunLedger {
    succeeded: Vec<TransferOutcome>,
    failed: Vec<TransferOutcome>,
    pending: Vec<TransferJob>,
}

impl RunLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an outcome to the matching list.
    pub fn record(&mut self, outcome: TransferOutcome) {
        if outcome.is_success() {
            self.succeeded.push(outcome);
        } else {
            self.failed.push(outcome);
        }
    }

    /// Remember jobs that were never dispatched.
    pub fn defer(&mut self, jobs: impl IntoIterator<Item = TransferJob>) {
        self.pending.extend(jobs);
    }

    /// Remove and return the failures worth another attempt.
    ///
    /// Deterministic failures stay in the failed list.
    pub fn take_retryable(&mut self) -> Vec<TransferOutcome> {
        let (retryable, settled): (Vec<_>, Vec<_>) = std::mem::take(&mut self.failed)
            .into_iter()
            .partition(TransferOutcome::is_retryable);
        self.failed = settled;
        retryable
    }

    /// Whether any current failure is worth another attempt.
    pub fn has_retryable(&self) -> bool {
        self.failed.iter().any(TransferOutcome::is_retryable)
    }

    /// Successful outcomes, in append order.
    pub fn succeeded(&self) -> &[TransferOutcome] {
        &self.succeeded
    }

    /// Failed outcomes, in append order.
    pub fn failed(&self) -> &[TransferOutcome] {
        &self.failed
    }

    /// Jobs never dispatched because of cancellation.
    pub fn pending(&self) -> &[TransferJob] {
        &self.pending
    }

    /// Locators that should be written to a failure ledger.
    pub fn unfinished_locators(&self) -> Vec<String> {
        self.failed
            .iter()
            .map(|o| o.job.locator())
            .chain(self.pending.iter().map(TransferJob::locator))
            .map(str::to_string)
            .collect()
    }

    /// Counts for the run.
    pub fn summary(&self, total: usize, cancelled: bool) -> RunSummary {
        RunSummary {
            total,
            succeeded: self.succeeded.len(),
            already_present: self
                .succeeded
                .iter()
                .filter(|o| o.status == TransferStatus::AlreadyPresent)
                .count(),
            failed: self.failed.len(),
            not_attempted: self.pending.len(),
            cancelled,
        }
    }
}

/// Name of a locator file created at the current local time.
pub fn timestamped_file_name(prefix: &str) -> String {
    let stamp = Local::now().format(CAPTURE_TIMESTAMP_FORMAT);
    format!("{prefix}{stamp}.txt")
}

/// Write `locators` one per line to a new timestamped file in `dir`.
pub async fn write_locator_file(
    dir: &Path,
    prefix: &str,
    locators: &[String],
) -> Result<PathBuf, DownloadError> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| DownloadError::from_io_error(&e))?;

    let path = dir.join(timestamped_file_name(prefix));
    let mut contents = String::new();
    for locator in locators {
        contents.push_str(locator);
        contents.push('\n');
    }

    let mut file = tokio::fs::File::create(&path)
        .await
        .map_err(|e| DownloadError::from_io_error(&e))?;
    file.write_all(contents.as_bytes())
        .await
        .map_err(|e| DownloadError::from_io_error(&e))?;
    file.flush()
        .await
        .map_err(|e| DownloadError::from_io_error(&e))?;

    info!(path = %path.display(), count = locators.len(), "Wrote locator file");
    Ok(path)
}

/// Persist residual failures as `failed_links_<timestamp>.txt`.
pub async fn write_failure_ledger(
    dir: &Path,
    locators: &[String],
) -> Result<PathBuf, DownloadError> {
    write_locator_file(dir, FAILURE_LEDGER_PREFIX, locators).await
}

/// Read a locator file: one locator per line, blank lines ignored.
pub async fn read_locator_file(path: &Path) -> Result<Vec<String>, DownloadError> {
    let contents = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| DownloadError::from_io_error(&e))?;
    Ok(parse_locators(&contents))
}

/// Split text into locators, trimming whitespace and skipping blanks.
pub fn parse_locators(contents: &str) -> Vec<String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use tgfetch_core::errors::TransferError;
    use tgfetch_core::transfer::Transferred;

    use super::*;

    fn link(n: i64) -> TransferJob {
        TransferJob::link(format!("https://t.me/chan/{n}"))
    }

    #[test]
    fn ledger_partitions_outcomes() {
        let mut ledger = RunLedger::new();
        ledger.record(TransferOutcome::from_result(
            link(1),
            Ok(Transferred::downloaded(PathBuf::from("a"))),
        ));
        ledger.record(TransferOutcome::from_result(
            link(2),
            Ok(Transferred::existing(PathBuf::from("b"))),
        ));
        ledger.record(TransferOutcome::failed(
            link(3),
            TransferError::transport(3, "timeout"),
        ));
        ledger.defer([link(4)]);

        let summary = ledger.summary(4, true);
        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.already_present, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.not_attempted, 1);
        assert_eq!(
            ledger.unfinished_locators(),
            vec!["https://t.me/chan/3", "https://t.me/chan/4"]
        );

        assert_eq!(ledger.take_retryable().len(), 1);
        assert!(ledger.failed().is_empty());
    }

    #[test]
    fn take_retryable_leaves_deterministic_failures() {
        let mut ledger = RunLedger::new();
        ledger.record(TransferOutcome::failed(
            link(5),
            TransferError::no_matching_media(5, "photo"),
        ));
        ledger.record(TransferOutcome::failed(
            link(6),
            TransferError::transport(6, "timeout"),
        ));
        assert!(ledger.has_retryable());

        let retryable = ledger.take_retryable();
        assert_eq!(retryable.len(), 1);
        assert_eq!(retryable[0].job.locator(), "https://t.me/chan/6");
        assert_eq!(ledger.failed().len(), 1);
        assert!(!ledger.has_retryable());
    }

    #[test]
    fn ledger_file_name_pattern() {
        let name = timestamped_file_name(FAILURE_LEDGER_PREFIX);
        let stamp = name
            .strip_prefix("failed_links_")
            .and_then(|s| s.strip_suffix(".txt"))
            .unwrap();
        assert_eq!(stamp.len(), 15);
        assert_eq!(stamp.as_bytes()[8], b'_');
    }

    #[tokio::test]
    async fn failure_ledger_round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let locators = vec![
            "https://t.me/chan/3".to_string(),
            "https://t.me/c/55/7".to_string(),
        ];

        let path = write_failure_ledger(dir.path(), &locators).await.unwrap();
        assert!(path.file_name().unwrap().to_string_lossy().starts_with("failed_links_"));
        assert_eq!(read_locator_file(&path).await.unwrap(), locators);
    }

    #[test]
    fn parse_skips_blank_lines() {
        assert_eq!(
            parse_locators("  a \n\n\tb\r\n"),
            vec!["a".to_string(), "b".to_string()]
        );
    }
}
