//! Terminal rendering of transfer events.

use std::io::{self, IsTerminal};
use std::time::Duration;

use indicatif::{HumanBytes, ProgressBar, ProgressDrawTarget, ProgressStyle};
use tgfetch_core::TransferEvent;
use tgfetch_core::ports::TransferEventSink;

// ============================================================================
// Progress sink
// ============================================================================

/// `TransferEventSink` drawing one bar over the items of a run.
///
/// The bar counts finished items; byte progress of the item being written
/// is shown in the message. Retry rounds restart the bar over the items
/// being retried. Nothing is drawn when stdout is not a terminal.
pub struct CliProgressSink {
    bar: ProgressBar,
}

impl CliProgressSink {
    /// Create a sink, auto-detecting terminal capability.
    pub fn new() -> Self {
        if io::stdout().is_terminal() {
            let bar = ProgressBar::with_draw_target(None, ProgressDrawTarget::stdout());
            bar.set_style(spinner_style());
            bar.set_message("Scanning");
            bar.enable_steady_tick(Duration::from_millis(120));
            Self { bar }
        } else {
            Self::hidden()
        }
    }

    /// A sink that tracks state but never draws.
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }

    /// Clear the bar so a summary can be printed below it.
    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }

    #[cfg(test)]
    fn position(&self) -> (u64, Option<u64>) {
        (self.bar.position(), self.bar.length())
    }
}

impl Default for CliProgressSink {
    fn default() -> Self {
        Self::new()
    }
}

impl TransferEventSink for CliProgressSink {
    fn emit(&self, event: TransferEvent) {
        match event {
            TransferEvent::RunStarted { total, batches } => {
                self.bar.set_style(bar_style());
                self.bar.set_length(total as u64);
                self.bar.set_position(0);
                self.bar.set_message(format!("{batches} batch(es)"));
            }
            TransferEvent::BatchStarted { index, size } => {
                self.bar.set_message(format!("batch {index} ({size} items)"));
            }
            TransferEvent::ItemProgress {
                message_id,
                downloaded,
                total,
            } => {
                self.bar.set_message(format!(
                    "message {message_id}: {} / {}",
                    HumanBytes(downloaded),
                    HumanBytes(total)
                ));
            }
            TransferEvent::ItemFinished {
                locator,
                success,
                error,
                ..
            } => {
                self.bar.inc(1);
                // Outside a run the handler prints the outcome itself.
                if !success && self.bar.length().is_some() {
                    self.bar.println(format!(
                        "✗ {locator}: {}",
                        error.as_deref().unwrap_or("failed")
                    ));
                }
            }
            TransferEvent::BatchCompleted {
                completed,
                total,
                failed,
                ..
            } => {
                self.bar
                    .set_message(format!("{completed}/{total} done, {failed} failed"));
            }
            TransferEvent::RetryRoundStarted { round, pending } => {
                self.bar.set_length(pending as u64);
                self.bar.set_position(0);
                self.bar.set_message(format!("retry round {round}"));
            }
            TransferEvent::RunFinished { .. } => self.finish(),
            TransferEvent::FailuresPersisted { .. } => {}
        }
    }
}

fn spinner_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.green} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}

fn bar_style() -> ProgressStyle {
    ProgressStyle::with_template(
        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
    )
    .map_or_else(|_| ProgressStyle::default_bar(), |style| style.progress_chars("█▓░"))
}
