//! Transfer jobs, outcomes and run events.
//!
//! These are the value types the orchestrator exchanges with its transfer
//! strategies and event sinks. No I/O happens here.

mod events;
mod outcome;

pub use events::{RunSummary, TransferEvent};
pub use outcome::{TransferJob, TransferOutcome, TransferStatus, Transferred};
