//! Transfer event sink port.
//!
//! This port abstracts event delivery, allowing the orchestrator to report
//! progress without coupling to a terminal, GUI or log format.

use crate::transfer::TransferEvent;

/// Port for receiving orchestration events.
///
/// Implementations must not block; the orchestrator calls `emit` from its
/// join points and from inside byte-progress callbacks.
pub trait TransferEventSink: Send + Sync {
    /// Deliver an event.
    fn emit(&self, event: TransferEvent);
}

/// A no-op sink for tests and headless contexts.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTransferSink;

impl NoopTransferSink {
    /// Create a new no-op sink.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl TransferEventSink for NoopTransferSink {
    fn emit(&self, _event: TransferEvent) {}
}
