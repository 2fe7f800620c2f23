//! Hand-written fakes shared by the unit tests of this crate.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tgfetch_core::media::{MediaPayload, RemoteMessage};
use tgfetch_core::ports::{
    EntityHandle, MediaTransport, ProgressCallback, SessionInfo, TransferEventSink,
    TransportError,
};
use tgfetch_core::reference::CanonicalReference;
use tgfetch_core::transfer::TransferEvent;

/// A photo message of 10 bytes.
pub fn photo_message(id: i64) -> RemoteMessage {
    RemoteMessage::with_media(id, MediaPayload::Photo { size: Some(10) })
}

/// A document message with the given MIME type and no file name.
pub fn document_message(id: i64, mime: &str) -> RemoteMessage {
    RemoteMessage::with_media(
        id,
        MediaPayload::Document {
            mime_type: Some(mime.to_string()),
            file_name: None,
            size: Some(10),
        },
    )
}

/// In-memory transport.
///
/// Every username resolves unless listed in `unknown`; numeric encodings
/// never resolve. Transfers write nothing to disk.
#[derive(Default)]
pub struct FakeTransport {
    messages: Vec<RemoteMessage>,
    unknown: Vec<String>,
    failures: Mutex<HashMap<i64, u32>>,
    transfers: Mutex<Vec<i64>>,
    fetches: Mutex<Vec<i64>>,
    enumerations: AtomicUsize,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_messages(mut self, messages: Vec<RemoteMessage>) -> Self {
        self.messages = messages;
        self
    }

    /// Make `username` unknown to entity lookup.
    pub fn without_entity(mut self, username: &str) -> Self {
        self.unknown.push(username.to_string());
        self
    }

    /// Fail the first `times` transfers of `message_id`.
    pub fn failing(self, message_id: i64, times: u32) -> Self {
        if let Ok(mut failures) = self.failures.lock() {
            failures.insert(message_id, times);
        }
        self
    }

    pub fn transferred_ids(&self) -> Vec<i64> {
        self.transfers.lock().unwrap().clone()
    }

    pub fn fetched_ids(&self) -> Vec<i64> {
        self.fetches.lock().unwrap().clone()
    }

    pub fn enumeration_count(&self) -> usize {
        self.enumerations.load(Ordering::SeqCst)
    }

    pub fn peak_concurrency(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MediaTransport for FakeTransport {
    async fn connect(&self) -> Result<SessionInfo, TransportError> {
        Ok(SessionInfo {
            display_name: "Test Account".into(),
        })
    }

    async fn resolve_entity(
        &self,
        candidate: &CanonicalReference,
    ) -> Result<EntityHandle, TransportError> {
        match candidate {
            CanonicalReference::Username(name) if !self.unknown.contains(name) => Ok(EntityHandle {
                id: 1,
                title: name.clone(),
                username: Some(name.clone()),
            }),
            other => Err(TransportError::not_found(other.to_string())),
        }
    }

    async fn enumerate_messages(
        &self,
        _entity: &EntityHandle,
        limit: Option<usize>,
    ) -> Result<Vec<RemoteMessage>, TransportError> {
        self.enumerations.fetch_add(1, Ordering::SeqCst);
        let take = limit.unwrap_or(self.messages.len());
        Ok(self.messages.iter().take(take).cloned().collect())
    }

    async fn fetch_message(
        &self,
        _entity: &EntityHandle,
        message_id: i64,
    ) -> Result<RemoteMessage, TransportError> {
        self.fetches.lock().unwrap().push(message_id);
        self.messages
            .iter()
            .find(|m| m.id == message_id)
            .cloned()
            .ok_or_else(|| TransportError::not_found(format!("message {message_id}")))
    }

    async fn transfer_media(
        &self,
        message: &RemoteMessage,
        _destination: &Path,
        progress: Option<ProgressCallback>,
    ) -> Result<u64, TransportError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        tokio::task::yield_now().await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        self.transfers.lock().unwrap().push(message.id);

        {
            let mut failures = self.failures.lock().unwrap();
            if let Some(remaining) = failures.get_mut(&message.id) {
                if *remaining > 0 {
                    *remaining -= 1;
                    return Err(TransportError::unavailable("connection reset"));
                }
            }
        }

        if let Some(progress) = progress {
            progress(10, 10);
        }
        Ok(10)
    }
}

/// Sink that keeps every event.
#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<TransferEvent>>,
}

impl RecordingSink {
    pub fn events(&self) -> Vec<TransferEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Sizes of the batches in dispatch order.
    pub fn batch_sizes(&self) -> Vec<usize> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                TransferEvent::BatchStarted { size, .. } => Some(size),
                _ => None,
            })
            .collect()
    }
}

impl TransferEventSink for RecordingSink {
    fn emit(&self, event: TransferEvent) {
        self.events.lock().unwrap().push(event);
    }
}
