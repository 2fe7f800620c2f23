//! Channel resolution and batched media transfer for tgfetch.
//!
//! - `resolver` - locator to entity, through the ordered encoding fallback
//! - `orchestrator` - enumeration, batching, retry rounds, failure ledger
//! - `strategy` - how a single item becomes a local file
//! - `index` - files already present in the destination
//! - `ledger` - run ledgers and locator files
//! - `links` - media link extraction results

#![deny(unused_crate_dependencies)]

// Re-export core types for convenience
pub use tgfetch_core::errors::{DownloadError, DownloadResult, ResolutionError, TransferError};
pub use tgfetch_core::transfer::{RunSummary, TransferEvent, TransferOutcome, TransferStatus};

pub(crate) mod progress;

mod index;
mod ledger;
mod links;
mod orchestrator;
mod resolver;
mod strategy;

#[cfg(test)]
mod testing;

pub use index::ExistingFileIndex;
pub use ledger::{
    FAILURE_LEDGER_PREFIX, MEDIA_LINKS_PREFIX, RunLedger, parse_locators, read_locator_file,
    write_failure_ledger,
};
pub use links::{MediaLink, save_media_links};
pub use orchestrator::{OrchestratorConfig, OrchestratorDeps, RunReport, TransferOrchestrator};
pub use progress::ProgressThrottle;
pub use resolver::{ReferenceResolver, ResolvedReference};
pub use strategy::{ExistsSkippingTransfer, TransferFn, TransportTransfer};
