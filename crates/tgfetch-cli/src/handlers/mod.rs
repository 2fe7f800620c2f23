//! Command handlers.
//!
//! Handlers follow one pattern:
//! - Signature: `pub async fn execute(ctx: &CliContext, ...) -> Result<()>`
//! - Thin wrappers that:
//!   1. Turn command options into `DownloadSettings`
//!   2. Ask the context for an orchestrator and run it
//!   3. Format the outcome for the terminal
//!
//! Handlers do not classify, batch or retry anything themselves.

pub mod channel;
pub mod extract;
pub mod link;
pub mod links;

use tgfetch_core::RunSummary;

use crate::error::CliError;

/// Turn an unfinished run into an error so the exit code reflects it.
fn ensure_complete(summary: &RunSummary) -> Result<(), CliError> {
    if summary.cancelled {
        return Err(CliError::Cancelled);
    }
    if summary.failed > 0 || summary.not_attempted > 0 {
        return Err(CliError::Incomplete {
            failed: summary.failed,
            not_attempted: summary.not_attempted,
        });
    }
    Ok(())
}

/// `--limit` values arrive as `u64`; anything beyond `usize` means "all".
fn scan_limit(limit: Option<u64>) -> Option<usize> {
    limit.map(|l| usize::try_from(l).unwrap_or(usize::MAX))
}
