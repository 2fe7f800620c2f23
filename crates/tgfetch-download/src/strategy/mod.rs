//! Transfer strategies.
//!
//! A [`TransferFn`] turns one classified item into a local file. The
//! orchestrator receives a strategy value at construction time; resumed
//! runs compose [`ExistsSkippingTransfer`] around [`TransportTransfer`].

mod skip;
mod transport;

use async_trait::async_trait;
use tgfetch_core::errors::TransferError;
use tgfetch_core::media::MediaItem;
use tgfetch_core::transfer::Transferred;

pub use skip::ExistsSkippingTransfer;
pub use transport::TransportTransfer;

/// Transfer one item to local storage.
#[async_trait]
pub trait TransferFn: Send + Sync {
    /// Materialize `item` locally.
    async fn transfer(&self, item: &MediaItem) -> Result<Transferred, TransferError>;
}
