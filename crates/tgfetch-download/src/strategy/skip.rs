//! Skip items that already exist locally.

use std::sync::Arc;

use async_trait::async_trait;
use tgfetch_core::errors::TransferError;
use tgfetch_core::media::MediaItem;
use tgfetch_core::transfer::Transferred;
use tracing::debug;

use super::TransferFn;
use crate::index::ExistingFileIndex;

/// Decorator that short-circuits items found in an [`ExistingFileIndex`].
pub struct ExistsSkippingTransfer {
    inner: Arc<dyn TransferFn>,
    index: Arc<ExistingFileIndex>,
}

impl ExistsSkippingTransfer {
    /// Wrap `inner`, consulting `index` before every transfer.
    pub fn new(inner: Arc<dyn TransferFn>, index: Arc<ExistingFileIndex>) -> Self {
        Self { inner, index }
    }
}

#[async_trait]
impl TransferFn for ExistsSkippingTransfer {
    async fn transfer(&self, item: &MediaItem) -> Result<Transferred, TransferError> {
        if let Some(path) = self.index.find(item.id()) {
            debug!(message_id = item.id(), path = %path.display(), "Already downloaded, skipping");
            return Ok(Transferred::existing(path));
        }
        self.inner.transfer(item).await
    }
}
