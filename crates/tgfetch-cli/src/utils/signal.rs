//! Ctrl-C handling.

use tokio_util::sync::CancellationToken;
use tracing::warn;

/// Cancel `token` on the first Ctrl-C.
///
/// Transfers already in flight finish; the orchestrator stops at the next
/// batch boundary and reports the rest as not attempted. A second Ctrl-C
/// falls through to the default handler and kills the process.
pub fn cancel_on_ctrl_c(token: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, finishing the current batch");
            token.cancel();
        }
    });
}
