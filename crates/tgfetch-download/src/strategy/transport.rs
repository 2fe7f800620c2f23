//! Transfer through the transport.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Local;
use tgfetch_core::errors::TransferError;
use tgfetch_core::media::MediaItem;
use tgfetch_core::ports::{MediaTransport, ProgressCallback, TransferEventSink};
use tgfetch_core::transfer::{TransferEvent, Transferred};
use tracing::debug;

use super::TransferFn;
use crate::progress::ProgressThrottle;

/// Delegates the byte transfer to the transport.
///
/// Files are named after the wall-clock time of the attempt, so a retried
/// item gets a new name; the embedded message ID stays the same.
pub struct TransportTransfer {
    transport: Arc<dyn MediaTransport>,
    destination: PathBuf,
    sink: Arc<dyn TransferEventSink>,
}

impl TransportTransfer {
    /// Create a strategy writing into `destination`.
    pub fn new(
        transport: Arc<dyn MediaTransport>,
        destination: impl Into<PathBuf>,
        sink: Arc<dyn TransferEventSink>,
    ) -> Self {
        Self {
            transport,
            destination: destination.into(),
            sink,
        }
    }

    /// The directory files are written to.
    pub fn destination(&self) -> &Path {
        &self.destination
    }

    fn progress_callback(&self, message_id: i64) -> ProgressCallback {
        let sink = Arc::clone(&self.sink);
        let throttle = Mutex::new(ProgressThrottle::default());
        Box::new(move |downloaded, total| {
            let due = throttle
                .lock()
                .is_ok_and(|mut t| t.admit(downloaded, total));
            if due {
                sink.emit(TransferEvent::ItemProgress {
                    message_id,
                    downloaded,
                    total,
                });
            }
        })
    }
}

#[async_trait]
impl TransferFn for TransportTransfer {
    async fn transfer(&self, item: &MediaItem) -> Result<Transferred, TransferError> {
        let captured_at = Local::now().naive_local();
        let path = self.destination.join(item.file_name_at(&captured_at));
        let progress = item.size_bytes.map(|_| self.progress_callback(item.id()));

        let bytes = self
            .transport
            .transfer_media(&item.message, &path, progress)
            .await
            .map_err(|e| TransferError::transport(item.id(), e.to_string()))?;

        debug!(message_id = item.id(), bytes, path = %path.display(), "Transferred item");
        Ok(Transferred::downloaded(path))
    }
}
