//! Batch fan-out and retry rounds.

use futures_util::future::join_all;
use tgfetch_core::media::TypeFilter;
use tgfetch_core::transfer::{TransferEvent, TransferJob, TransferOutcome};
use tracing::{debug, info};

use super::{RunReport, TransferOrchestrator};
use crate::ledger::RunLedger;

impl TransferOrchestrator {
    /// Transfer `jobs` in consecutive batches of `batch_size`.
    ///
    /// Batch N+1 is dispatched only after every item of batch N has an
    /// outcome. A cancellation stops dispatch at the next boundary; the
    /// remaining jobs are kept as pending in the ledger.
    pub(super) async fn run_jobs(&self, jobs: Vec<TransferJob>, filter: &TypeFilter) -> RunReport {
        let total = jobs.len();
        let batch_size = self.config.batch_size;
        let batches = total.div_ceil(batch_size);

        self.sink.emit(TransferEvent::RunStarted { total, batches });
        info!(total, batches, batch_size, "Starting transfer run");

        let mut ledger = RunLedger::new();
        for (index, batch) in jobs.chunks(batch_size).enumerate() {
            if self.cancel.is_cancelled() {
                let remaining = &jobs[index * batch_size..];
                info!(not_attempted = remaining.len(), "Run cancelled");
                ledger.defer(remaining.iter().cloned());
                break;
            }

            let number = index + 1;
            self.sink.emit(TransferEvent::BatchStarted {
                index: number,
                size: batch.len(),
            });
            debug!(batch = number, size = batch.len(), "Dispatching batch");

            let outcomes = join_all(
                batch
                    .iter()
                    .cloned()
                    .map(|job| self.transfer_one(job, filter)),
            )
            .await;
            self.record_all(&mut ledger, outcomes);

            let succeeded = ledger.succeeded().len();
            let failed = ledger.failed().len();
            self.sink.emit(TransferEvent::BatchCompleted {
                index: number,
                completed: succeeded + failed,
                total,
                succeeded,
                failed,
            });
            info!(
                batch = number,
                of = batches,
                completed = succeeded + failed,
                total,
                succeeded,
                failed,
                "Batch complete"
            );
        }

        RunReport {
            summary: ledger.summary(total, self.cancel.is_cancelled()),
            ledger,
            ledger_file: None,
            retry_rounds: 0,
        }
    }

    /// Re-attempt the failed ledger for up to `max_rounds` rounds.
    ///
    /// Each round retries every current transport failure, in slices of
    /// `batch_size`, after a pause of `retry_delay`. Messages without
    /// matching media stay failed untouched. Stops early once nothing is
    /// retryable or the run is cancelled. Returns the number of rounds run.
    pub async fn retry_failed(
        &self,
        ledger: &mut RunLedger,
        filter: &TypeFilter,
        max_rounds: u32,
    ) -> u32 {
        let mut rounds = 0;

        for round in 1..=max_rounds {
            if !ledger.has_retryable() || !self.pause_before_retry().await {
                break;
            }

            let pending = ledger.take_retryable();
            let settled = ledger.failed().len();
            self.sink.emit(TransferEvent::RetryRoundStarted {
                round,
                pending: pending.len(),
            });
            info!(round, pending = pending.len(), "Retrying failed items");
            rounds = round;

            let mut slices = pending.chunks(self.config.batch_size);
            for slice in slices.by_ref() {
                let outcomes =
                    join_all(slice.iter().cloned().map(|prev| self.retry_one(prev, filter)))
                        .await;
                self.record_all(ledger, outcomes);

                if self.cancel.is_cancelled() {
                    break;
                }
            }
            // Slices never dispatched keep their previous failure.
            for rest in slices {
                for outcome in rest {
                    ledger.record(outcome.clone());
                }
            }

            let still_failing = ledger.failed().len() - settled;
            info!(
                round,
                recovered = pending.len() - still_failing,
                still_failing,
                "Retry round complete"
            );
        }

        rounds
    }

    async fn retry_one(&self, previous: TransferOutcome, filter: &TypeFilter) -> TransferOutcome {
        let attempts = previous.attempts;
        let mut outcome = self.transfer_one(previous.job, filter).await;
        outcome.attempts = attempts + 1;
        outcome
    }

    /// Wait `retry_delay`; false when cancelled first.
    async fn pause_before_retry(&self) -> bool {
        if self.cancel.is_cancelled() {
            return false;
        }
        if self.config.retry_delay.is_zero() {
            return true;
        }
        tokio::select! {
            () = self.cancel.cancelled() => false,
            () = tokio::time::sleep(self.config.retry_delay) => true,
        }
    }

    fn record_all(&self, ledger: &mut RunLedger, outcomes: Vec<TransferOutcome>) {
        for outcome in outcomes {
            self.report_outcome(&outcome);
            ledger.record(outcome);
        }
    }
}
