//! Run events - discriminated union for everything a front-end may render.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Counts for one orchestration run.
///
/// `succeeded + failed + not_attempted == total` always holds.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Candidate items after filtering.
    pub total: usize,
    /// Items that ended in success (including already-present files).
    pub succeeded: usize,
    /// Subset of `succeeded` that were found on disk and skipped.
    pub already_present: usize,
    /// Items still failing.
    pub failed: usize,
    /// Items never dispatched because the run was cancelled.
    pub not_attempted: usize,
    /// Whether a cancellation stopped the run early.
    pub cancelled: bool,
}

impl RunSummary {
    /// Items that have reached a final state.
    pub const fn completed(&self) -> usize {
        self.succeeded + self.failed
    }

    /// True when every candidate succeeded.
    pub const fn is_clean(&self) -> bool {
        self.failed == 0 && self.not_attempted == 0
    }
}

/// Single discriminated union for orchestration progress.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TransferEvent {
    /// Candidates are known and batching is about to start.
    RunStarted {
        /// Candidate items after filtering.
        total: usize,
        /// Number of batches they were split into.
        batches: usize,
    },

    /// A batch is being dispatched.
    BatchStarted {
        /// 1-based batch number.
        index: usize,
        /// Items in this batch.
        size: usize,
    },

    /// Byte progress for one item (rate-limited).
    ItemProgress {
        /// Message being transferred.
        message_id: i64,
        /// Bytes written so far.
        downloaded: u64,
        /// Total bytes expected.
        total: u64,
    },

    /// One item reached Success or Failure.
    ItemFinished {
        /// Locator of the job.
        locator: String,
        /// Message ID when known.
        #[serde(skip_serializing_if = "Option::is_none")]
        message_id: Option<i64>,
        /// Whether the item succeeded.
        success: bool,
        /// Failure reason.
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },

    /// Every item of a batch has resolved.
    BatchCompleted {
        /// 1-based batch number.
        index: usize,
        /// Items completed so far in the run.
        completed: usize,
        /// Candidate items in the run.
        total: usize,
        /// Succeeded so far.
        succeeded: usize,
        /// Failed so far.
        failed: usize,
    },

    /// A retry round over the failed ledger is starting.
    RetryRoundStarted {
        /// 1-based round number.
        round: u32,
        /// Items being retried.
        pending: usize,
    },

    /// The run (including retries) is over.
    RunFinished {
        /// Final counts.
        summary: RunSummary,
    },

    /// Residual failures were written to a ledger file.
    FailuresPersisted {
        /// Ledger file path.
        path: PathBuf,
        /// Number of locators written.
        count: usize,
    },
}
