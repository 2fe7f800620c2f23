//! Core domain types and port definitions for tgfetch.
//!
//! This crate holds everything that is pure: locator parsing and the
//! canonical encodings a channel may be addressed by, media
//! classification and file naming, transfer outcomes and run events, and
//! the [`MediaTransport`] / [`TransferEventSink`] ports that adapters
//! implement. Orchestration lives in `tgfetch-download`.

#![deny(unused_crate_dependencies)]

pub mod errors;
pub mod media;
pub mod paths;
pub mod ports;
pub mod reference;
pub mod settings;
pub mod transfer;

pub use errors::{DownloadError, DownloadResult, ResolutionError, TransferError};
pub use media::{
    CAPTURE_TIMESTAMP_FORMAT, MediaItem, MediaKind, MediaPayload, RemoteMessage, TypeFilter,
    message_id_from_file_name,
};
pub use paths::{MissingDirectory, PathError, prepare_destination};
pub use ports::{
    EntityHandle, MediaTransport, NoopTransferSink, ProgressCallback, SessionInfo,
    TransferEventSink, TransportError,
};
pub use reference::{
    CanonicalReference, LocatorForm, LocatorTarget, ParsedLocator, SUPERGROUP_OFFSET,
};
pub use settings::{
    DEFAULT_BATCH_SIZE, DEFAULT_DESTINATION, DEFAULT_LINK_BATCH_SIZE, DEFAULT_MAX_RETRY_ROUNDS,
    DEFAULT_RETRY_DELAY, DownloadSettings, MAX_BATCH_SIZE, SettingsError,
};
pub use transfer::{
    RunSummary, TransferEvent, TransferJob, TransferOutcome, TransferStatus, Transferred,
};
