//! Port definitions (trait abstractions) for external systems.
//!
//! Ports define the interfaces that the core domain expects from infrastructure.
//! They contain no implementation details and use only domain types.

pub mod event_sink;
pub mod transport;

pub use event_sink::{NoopTransferSink, TransferEventSink};
pub use transport::{
    EntityHandle, MediaTransport, ProgressCallback, SessionInfo, TransportError,
};
