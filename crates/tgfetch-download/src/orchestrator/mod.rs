//! Batched transfer orchestration.
//!
//! # Architecture
//!
//! - **Resolver**: turns the user's locator into an entity handle
//! - **Enumeration**: classify and filter the channel's messages into jobs
//! - **Batches**: fixed-size slices transferred concurrently, one join per batch
//! - **Retry rounds**: bounded re-attempts of the failed ledger
//! - **Ledger file**: residual failures persisted for a later run
//!
//! # Concurrency Model
//!
//! - One control flow; each batch fans out `batch_size` futures and joins them
//! - Ledgers are only touched after a join, never from inside a transfer
//! - Cancellation is checked before enumeration, between batches and
//!   between retry rounds; dispatched items always finish

mod batch;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tgfetch_core::errors::{DownloadError, TransferError};
use tgfetch_core::media::{MediaItem, TypeFilter};
use tgfetch_core::ports::{EntityHandle, MediaTransport, TransferEventSink};
use tgfetch_core::reference::ParsedLocator;
use tgfetch_core::settings::{DownloadSettings, MAX_BATCH_SIZE};
use tgfetch_core::transfer::{RunSummary, TransferEvent, TransferJob, TransferOutcome};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::ledger::{RunLedger, write_failure_ledger};
use crate::links::MediaLink;
use crate::resolver::{ReferenceResolver, ResolvedReference};
use crate::strategy::TransferFn;

// =============================================================================
// Configuration
// =============================================================================

/// Tunables of an orchestration run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrchestratorConfig {
    /// Items transferred concurrently per batch and per retry slice.
    pub batch_size: usize,
    /// Retry rounds after the main pass.
    pub max_retry_rounds: u32,
    /// Pause before each retry round.
    pub retry_delay: Duration,
    /// Where residual failures are written.
    pub ledger_dir: PathBuf,
}

impl OrchestratorConfig {
    /// Take the orchestration values from validated settings.
    pub fn from_settings(settings: &DownloadSettings) -> Result<Self, DownloadError> {
        settings.validate()?;
        Ok(Self {
            batch_size: settings.batch_size,
            max_retry_rounds: settings.max_retry_rounds,
            retry_delay: settings.retry_delay,
            ledger_dir: settings.ledger_dir.clone(),
        })
    }
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        let settings = DownloadSettings::default();
        Self {
            batch_size: settings.batch_size,
            max_retry_rounds: settings.max_retry_rounds,
            retry_delay: settings.retry_delay,
            ledger_dir: settings.ledger_dir,
        }
    }
}

/// Collaborators of the orchestrator.
#[derive(Clone)]
pub struct OrchestratorDeps {
    /// Remote service.
    pub transport: Arc<dyn MediaTransport>,
    /// How one item becomes a local file.
    pub transfer: Arc<dyn TransferFn>,
    /// Receiver of run events.
    pub sink: Arc<dyn TransferEventSink>,
}

// =============================================================================
// Run report
// =============================================================================

/// Everything a front-end needs after a run.
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Final counts.
    pub summary: RunSummary,
    /// Per-item outcomes.
    pub ledger: RunLedger,
    /// Failure ledger file, when residual failures were persisted.
    pub ledger_file: Option<PathBuf>,
    /// Retry rounds actually run.
    pub retry_rounds: u32,
}

// =============================================================================
// Orchestrator
// =============================================================================

/// Drives resolution, batching, retries and failure persistence.
pub struct TransferOrchestrator {
    transport: Arc<dyn MediaTransport>,
    resolver: ReferenceResolver,
    transfer: Arc<dyn TransferFn>,
    sink: Arc<dyn TransferEventSink>,
    config: OrchestratorConfig,
    cancel: CancellationToken,
}

impl TransferOrchestrator {
    /// Create an orchestrator. The batch size is clamped to `1..=100`.
    pub fn new(deps: OrchestratorDeps, mut config: OrchestratorConfig) -> Self {
        config.batch_size = config.batch_size.clamp(1, MAX_BATCH_SIZE);
        Self {
            resolver: ReferenceResolver::new(Arc::clone(&deps.transport)),
            transport: deps.transport,
            transfer: deps.transfer,
            sink: deps.sink,
            config,
            cancel: CancellationToken::new(),
        }
    }

    /// Use an externally owned cancellation token.
    #[must_use]
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Token that stops the run at the next batch boundary.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// The resolver used for channel and link locators.
    pub const fn resolver(&self) -> &ReferenceResolver {
        &self.resolver
    }

    /// Current configuration.
    pub const fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    // -------------------------------------------------------------------------
    // Top-level entry points
    // -------------------------------------------------------------------------

    /// Resolve a channel, transfer its matching media, retry, and persist
    /// residual failures.
    pub async fn download_channel(
        &self,
        locator: &str,
        filter: &TypeFilter,
        limit: Option<usize>,
    ) -> Result<RunReport, DownloadError> {
        let resolved = self.resolver.resolve(locator).await?;
        info!(locator, channel = %resolved.reference, title = %resolved.entity.title, "Resolved channel");
        let report = self.run(&resolved, filter, limit).await?;
        self.finish(report, filter).await
    }

    /// Transfer a list of message links, retry, and persist residual failures.
    pub async fn download_links(
        &self,
        links: Vec<String>,
        filter: &TypeFilter,
    ) -> Result<RunReport, DownloadError> {
        let report = self.run_links(links, filter).await;
        self.finish(report, filter).await
    }

    /// Fetch and transfer the single message a link points at.
    ///
    /// Skips enumeration and batching. Resolution problems are returned as
    /// errors; anything after resolution is reported in the outcome.
    pub async fn download_from_link(
        &self,
        locator: &str,
        filter: &TypeFilter,
    ) -> Result<TransferOutcome, DownloadError> {
        let parsed = ParsedLocator::parse(locator)?;
        let message_id = parsed.require_message_id()?;
        let resolved = self.resolver.resolve_parsed(parsed).await?;
        let link = locator.trim().to_string();

        let outcome = match self.fetch_item(&resolved.entity, message_id, filter).await {
            Ok(item) => self.transfer_item(item, link).await,
            Err(err) => TransferOutcome::failed(TransferJob::link(link), err),
        };
        self.report_outcome(&outcome);
        Ok(outcome)
    }

    /// List the matching media of a channel as message links.
    pub async fn collect_links(
        &self,
        resolved: &ResolvedReference,
        filter: &TypeFilter,
        limit: Option<usize>,
    ) -> Result<Vec<MediaLink>, DownloadError> {
        let items = self.candidates(resolved, filter, limit).await?;
        Ok(items
            .iter()
            .map(|item| MediaLink::new(&resolved.reference, item))
            .collect())
    }

    // -------------------------------------------------------------------------
    // Run phases
    // -------------------------------------------------------------------------

    /// Enumerate, classify, filter and transfer in batches. No retries.
    pub async fn run(
        &self,
        resolved: &ResolvedReference,
        filter: &TypeFilter,
        limit: Option<usize>,
    ) -> Result<RunReport, DownloadError> {
        let jobs = self
            .candidates(resolved, filter, limit)
            .await?
            .into_iter()
            .map(|item| {
                let link = resolved.message_link(item.id());
                TransferJob::item(item, link)
            })
            .collect();
        Ok(self.run_jobs(jobs, filter).await)
    }

    /// Transfer message links in batches. No retries.
    ///
    /// Links that fail to parse, resolve or fetch are item failures.
    pub async fn run_links(&self, links: Vec<String>, filter: &TypeFilter) -> RunReport {
        let jobs = links.into_iter().map(TransferJob::link).collect();
        self.run_jobs(jobs, filter).await
    }

    /// Retry rounds, final summary, and failure-ledger persistence.
    async fn finish(
        &self,
        mut report: RunReport,
        filter: &TypeFilter,
    ) -> Result<RunReport, DownloadError> {
        report.retry_rounds = self
            .retry_failed(&mut report.ledger, filter, self.config.max_retry_rounds)
            .await;
        report.summary = report
            .ledger
            .summary(report.summary.total, self.cancel.is_cancelled());

        for outcome in report.ledger.failed() {
            if let Some(err) = outcome.error() {
                warn!(locator = outcome.job.locator(), attempts = outcome.attempts, error = %err, "Giving up on item");
            }
        }
        self.sink.emit(TransferEvent::RunFinished {
            summary: report.summary.clone(),
        });

        let unfinished = report.ledger.unfinished_locators();
        if !unfinished.is_empty() {
            let path = write_failure_ledger(&self.config.ledger_dir, &unfinished).await?;
            self.sink.emit(TransferEvent::FailuresPersisted {
                path: path.clone(),
                count: unfinished.len(),
            });
            report.ledger_file = Some(path);
        }

        Ok(report)
    }

    // -------------------------------------------------------------------------
    // Item helpers
    // -------------------------------------------------------------------------

    async fn candidates(
        &self,
        resolved: &ResolvedReference,
        filter: &TypeFilter,
        limit: Option<usize>,
    ) -> Result<Vec<MediaItem>, DownloadError> {
        if self.cancel.is_cancelled() {
            return Err(DownloadError::Cancelled);
        }

        let messages = self
            .transport
            .enumerate_messages(&resolved.entity, limit)
            .await
            .map_err(|e| TransferError::transport_unbound(format!("enumeration failed: {e}")))?;
        let scanned = messages.len();

        let items: Vec<MediaItem> = messages
            .into_iter()
            .filter_map(MediaItem::classify)
            .filter(|item| filter.accepts(item))
            .collect();

        info!(
            channel = %resolved.reference,
            scanned,
            candidates = items.len(),
            filter = %filter,
            "Enumerated channel"
        );
        Ok(items)
    }

    /// Attempt one job. Failures are captured in the outcome.
    pub async fn transfer_one(&self, job: TransferJob, filter: &TypeFilter) -> TransferOutcome {
        let outcome = match job {
            TransferJob::Item { item, link } => self.transfer_item(item, link).await,
            TransferJob::Link { link } => match self.fetch_link(&link, filter).await {
                Ok(item) => self.transfer_item(item, link).await,
                Err(err) => TransferOutcome::failed(TransferJob::Link { link }, err),
            },
        };

        if let Some(err) = outcome.error() {
            warn!(locator = outcome.job.locator(), error = %err, "Item failed");
        }
        outcome
    }

    async fn transfer_item(&self, item: MediaItem, link: String) -> TransferOutcome {
        let result = self.transfer.transfer(&item).await;
        TransferOutcome::from_result(TransferJob::item(item, link), result)
    }

    async fn fetch_link(&self, link: &str, filter: &TypeFilter) -> Result<MediaItem, TransferError> {
        let parsed =
            ParsedLocator::parse(link).map_err(|e| TransferError::transport_unbound(e.to_string()))?;
        let message_id = parsed
            .require_message_id()
            .map_err(|e| TransferError::transport_unbound(e.to_string()))?;
        let resolved = self
            .resolver
            .resolve_parsed(parsed)
            .await
            .map_err(|e| TransferError::transport(message_id, e.to_string()))?;
        self.fetch_item(&resolved.entity, message_id, filter).await
    }

    async fn fetch_item(
        &self,
        entity: &EntityHandle,
        message_id: i64,
        filter: &TypeFilter,
    ) -> Result<MediaItem, TransferError> {
        let message = self
            .transport
            .fetch_message(entity, message_id)
            .await
            .map_err(|e| TransferError::transport(message_id, e.to_string()))?;

        let item = MediaItem::classify(message)
            .ok_or_else(|| TransferError::no_matching_media(message_id, "none"))?;
        if !filter.accepts(&item) {
            return Err(TransferError::no_matching_media(message_id, item.kind.as_str()));
        }
        Ok(item)
    }

    fn report_outcome(&self, outcome: &TransferOutcome) {
        self.sink.emit(TransferEvent::ItemFinished {
            locator: outcome.job.locator().to_string(),
            message_id: outcome.message_id(),
            success: outcome.is_success(),
            error: outcome.error().map(ToString::to_string),
        });
    }
}

#[cfg(test)]
mod tests {
    use tgfetch_core::media::MediaKind;
    use tgfetch_core::ports::NoopTransferSink;
    use tgfetch_core::transfer::TransferStatus;

    use super::*;
    use crate::ledger::read_locator_file;
    use crate::strategy::TransportTransfer;
    use crate::testing::{FakeTransport, RecordingSink, document_message, photo_message};

    fn orchestrator(
        transport: &Arc<FakeTransport>,
        sink: Arc<dyn TransferEventSink>,
        ledger_dir: &std::path::Path,
    ) -> TransferOrchestrator {
        let transfer = Arc::new(TransportTransfer::new(
            transport.clone(),
            "unused",
            Arc::new(NoopTransferSink),
        ));
        TransferOrchestrator::new(
            OrchestratorDeps {
                transport: transport.clone(),
                transfer,
                sink,
            },
            OrchestratorConfig {
                batch_size: 10,
                max_retry_rounds: 3,
                retry_delay: Duration::ZERO,
                ledger_dir: ledger_dir.to_path_buf(),
            },
        )
    }

    #[tokio::test]
    async fn direct_link_skips_enumeration() {
        let dir = tempfile::tempdir().unwrap();
        let transport =
            Arc::new(FakeTransport::new().with_messages(vec![photo_message(122), photo_message(123)]));
        let orch = orchestrator(&transport, Arc::new(NoopTransferSink), dir.path());

        let outcome = orch
            .download_from_link("https://t.me/examplechan/123", &TypeFilter::all())
            .await
            .unwrap();

        assert_eq!(outcome.status, TransferStatus::Transferred);
        assert_eq!(outcome.job.locator(), "https://t.me/examplechan/123");
        assert_eq!(transport.enumeration_count(), 0);
        assert_eq!(transport.fetched_ids(), vec![123]);
        assert_eq!(transport.transferred_ids(), vec![123]);
    }

    #[tokio::test]
    async fn direct_link_requires_message_id() {
        let dir = tempfile::tempdir().unwrap();
        let transport = Arc::new(FakeTransport::new());
        let orch = orchestrator(&transport, Arc::new(NoopTransferSink), dir.path());

        let err = orch
            .download_from_link("https://t.me/examplechan", &TypeFilter::all())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DownloadError::Resolution(tgfetch_core::ResolutionError::MalformedLocator { .. })
        ));
    }

    #[tokio::test]
    async fn direct_link_filtered_out_is_no_matching_media() {
        let dir = tempfile::tempdir().unwrap();
        let transport = Arc::new(FakeTransport::new().with_messages(vec![photo_message(5)]));
        let orch = orchestrator(&transport, Arc::new(NoopTransferSink), dir.path());

        let outcome = orch
            .download_from_link("t.me/examplechan/5", &TypeFilter::parse("video"))
            .await
            .unwrap();
        assert_eq!(
            outcome.error(),
            Some(&TransferError::no_matching_media(5, "photo"))
        );
        assert!(transport.transferred_ids().is_empty());
    }

    #[tokio::test]
    async fn unknown_channel_aborts_before_enumeration() {
        let dir = tempfile::tempdir().unwrap();
        let transport = Arc::new(FakeTransport::new().without_entity("ghost"));
        let orch = orchestrator(&transport, Arc::new(NoopTransferSink), dir.path());

        let err = orch
            .download_channel("ghost", &TypeFilter::all(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, DownloadError::Resolution(_)));
        assert_eq!(transport.enumeration_count(), 0);
    }

    #[tokio::test]
    async fn retry_converges_and_writes_no_ledger() {
        let dir = tempfile::tempdir().unwrap();
        let transport = Arc::new(
            FakeTransport::new()
                .with_messages((1..=4).map(photo_message).collect())
                .failing(3, 2),
        );
        let sink = Arc::new(RecordingSink::default());
        let orch = orchestrator(&transport, sink.clone(), dir.path());

        let report = orch
            .download_channel("examplechan", &TypeFilter::all(), None)
            .await
            .unwrap();

        assert_eq!(report.summary.failed, 0);
        assert_eq!(report.summary.succeeded, 4);
        assert_eq!(report.retry_rounds, 2);
        assert!(report.ledger_file.is_none());
        assert_eq!(transport.transferred_ids().iter().filter(|id| **id == 3).count(), 3);

        let retried = report
            .ledger
            .succeeded()
            .iter()
            .find(|o| o.message_id() == Some(3))
            .unwrap();
        assert_eq!(retried.attempts, 3);
        assert!(sink.events().iter().any(|e| matches!(e, TransferEvent::RunFinished { .. })));
    }

    #[tokio::test]
    async fn residual_failures_are_persisted_as_links() {
        let dir = tempfile::tempdir().unwrap();
        let transport = Arc::new(
            FakeTransport::new()
                .with_messages(vec![photo_message(1), photo_message(2)])
                .failing(2, u32::MAX),
        );
        let sink = Arc::new(RecordingSink::default());
        let orch = orchestrator(&transport, sink.clone(), dir.path());

        let report = orch
            .download_channel("@examplechan", &TypeFilter::all(), None)
            .await
            .unwrap();

        assert_eq!(report.summary.failed, 1);
        assert_eq!(report.retry_rounds, 3);
        let path = report.ledger_file.unwrap();
        assert_eq!(path.parent(), Some(dir.path()));
        assert_eq!(
            read_locator_file(&path).await.unwrap(),
            vec!["https://t.me/examplechan/2"]
        );
        assert!(sink.events().iter().any(|e| matches!(
            e,
            TransferEvent::FailuresPersisted { count: 1, .. }
        )));
    }

    #[tokio::test]
    async fn link_failures_never_abort_the_run() {
        let dir = tempfile::tempdir().unwrap();
        let transport = Arc::new(
            FakeTransport::new()
                .with_messages(vec![photo_message(1)])
                .without_entity("ghost"),
        );
        let orch = orchestrator(&transport, Arc::new(NoopTransferSink), dir.path());

        let links = vec![
            "https://t.me/examplechan/1".to_string(),
            "https://t.me/examplechan".to_string(),
            "https://t.me/ghost/4".to_string(),
            "https://t.me/examplechan/99".to_string(),
        ];
        let report = orch.download_links(links, &TypeFilter::all()).await.unwrap();

        assert_eq!(report.summary.total, 4);
        assert_eq!(report.summary.succeeded, 1);
        assert_eq!(report.summary.failed, 3);
        let path = report.ledger_file.unwrap();
        assert_eq!(read_locator_file(&path).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn collect_links_lists_matching_media() {
        let dir = tempfile::tempdir().unwrap();
        let transport = Arc::new(FakeTransport::new().with_messages(vec![
            photo_message(1),
            document_message(2, "video/mp4"),
            tgfetch_core::media::RemoteMessage::text(3),
        ]));
        let orch = orchestrator(&transport, Arc::new(NoopTransferSink), dir.path());

        let resolved = orch.resolver().resolve("examplechan").await.unwrap();
        let links = orch
            .collect_links(&resolved, &TypeFilter::parse("video"), None)
            .await
            .unwrap();

        assert_eq!(links.len(), 1);
        assert_eq!(links[0].link, "https://t.me/examplechan/2");
        assert_eq!(links[0].kind, MediaKind::Extension("mp4".into()));
        assert!(transport.transferred_ids().is_empty());
    }

    #[tokio::test]
    async fn cancelled_before_enumeration() {
        let dir = tempfile::tempdir().unwrap();
        let transport = Arc::new(FakeTransport::new().with_messages(vec![photo_message(1)]));
        let orch = orchestrator(&transport, Arc::new(NoopTransferSink), dir.path());
        orch.cancellation_token().cancel();

        let err = orch
            .download_channel("examplechan", &TypeFilter::all(), None)
            .await
            .unwrap_err();
        assert!(err.is_cancelled());
        assert_eq!(transport.enumeration_count(), 0);
    }
}
