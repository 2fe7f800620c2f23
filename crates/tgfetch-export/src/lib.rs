//! Telegram Desktop export transport for tgfetch.
//!
//! Implements the core `MediaTransport` port over a directory produced by
//! Telegram Desktop's "Export chat history" (JSON format). Channels are
//! looked up by name or by any of their numeric encodings, messages are
//! read from `result.json`, and media is copied out of the export.

#![deny(unused_crate_dependencies)]

// Used only by the integration tests.
#[cfg(test)]
use tgfetch_download as _;

mod copy;
mod error;
mod models;
mod transport;

pub use error::{ExportError, ExportResult};
pub use transport::{ExportTransport, RESULT_FILE};
