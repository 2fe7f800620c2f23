//! CLI bootstrap - the composition root.
//!
//! This module is the ONLY place where infrastructure is wired together
//! for the CLI adapter:
//! - Export transport (via tgfetch-export)
//! - Transfer strategy and existing-file index (via tgfetch-download)
//! - Cancellation token shared with the Ctrl-C handler
//!
//! Command handlers receive the composed `CliContext` and ask it for an
//! orchestrator configured for their run.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tgfetch_core::paths::{MissingDirectory, prepare_destination};
use tgfetch_core::ports::{MediaTransport, SessionInfo, TransferEventSink};
use tgfetch_core::{DEFAULT_DESTINATION, DownloadSettings, TypeFilter};
use tgfetch_download::{
    ExistingFileIndex, ExistsSkippingTransfer, OrchestratorConfig, OrchestratorDeps,
    TransferFn, TransferOrchestrator, TransportTransfer,
};
use tgfetch_export::ExportTransport;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::commands::TransferOptions;
use crate::error::CliError;
use crate::parser::Cli;

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins; otherwise `info`, or `debug` when `verbose` is set.
/// Logs go to stderr so they do not interleave with progress bars.
pub fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Load a `.env` file from the working directory or its parents, if any.
pub fn load_env() -> Option<PathBuf> {
    dotenvy::dotenv().ok()
}

/// Bootstrap configuration for the CLI.
#[derive(Debug, Clone)]
pub struct CliConfig {
    /// Telegram Desktop export directory.
    pub export_dir: PathBuf,
    /// Where downloaded files go.
    pub destination: PathBuf,
    /// Where failure ledgers and link lists are written.
    pub ledger_dir: PathBuf,
}

impl CliConfig {
    /// Build the config from global flags (and their environment fallbacks).
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        let export_dir = cli.export_dir.clone().ok_or_else(|| {
            CliError::Config(
                "no export directory: pass --export-dir or set TGFETCH_EXPORT_DIR".to_string(),
            )
        })?;
        Ok(Self {
            export_dir,
            destination: cli
                .dest
                .clone()
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DESTINATION)),
            ledger_dir: PathBuf::from("."),
        })
    }
}

/// Fully composed application context for CLI commands.
pub struct CliContext {
    /// Transport every orchestrator is built on.
    pub transport: Arc<ExportTransport>,
    /// Who the transport is connected as.
    pub session: SessionInfo,
    /// Bootstrap configuration.
    pub config: CliConfig,
    /// Cancelled on Ctrl-C.
    pub cancel: CancellationToken,
}

impl CliContext {
    /// Merge command options into the base settings for a run.
    pub fn settings(
        &self,
        base: DownloadSettings,
        types: Option<&str>,
        options: &TransferOptions,
    ) -> DownloadSettings {
        let mut settings = base
            .with_destination(&self.config.destination)
            .with_ledger_dir(&self.config.ledger_dir)
            .with_type_filter(types.map_or_else(TypeFilter::all, TypeFilter::parse))
            .with_skip_existing(options.resume);
        if let Some(size) = options.batch_size {
            settings = settings.with_batch_size(usize::try_from(size).unwrap_or(usize::MAX));
        }
        if let Some(rounds) = options.max_retries {
            settings = settings.with_max_retry_rounds(rounds);
        }
        if let Some(secs) = options.retry_delay {
            settings = settings.with_retry_delay(Duration::from_secs(secs));
        }
        settings
    }

    /// Create the destination directory if needed and check it is writable.
    pub fn prepare_destination(&self, settings: &DownloadSettings) -> Result<(), CliError> {
        prepare_destination(&settings.destination, MissingDirectory::Create)?;
        Ok(())
    }

    /// Build an orchestrator for one run.
    ///
    /// With `skip_existing`, the destination is indexed once here and the
    /// transfer strategy is wrapped so indexed messages are not fetched again.
    pub async fn orchestrator(
        &self,
        settings: &DownloadSettings,
        sink: Arc<dyn TransferEventSink>,
    ) -> Result<TransferOrchestrator, CliError> {
        let config = OrchestratorConfig::from_settings(settings)?;
        let transport: Arc<dyn MediaTransport> = self.transport.clone();

        let mut transfer: Arc<dyn TransferFn> = Arc::new(TransportTransfer::new(
            Arc::clone(&transport),
            &settings.destination,
            Arc::clone(&sink),
        ));
        if settings.skip_existing {
            let index = ExistingFileIndex::scan(&settings.destination).await?;
            info!(
                dir = %settings.destination.display(),
                files = index.len(),
                "Indexed existing downloads"
            );
            transfer = Arc::new(ExistsSkippingTransfer::new(transfer, Arc::new(index)));
        }

        Ok(TransferOrchestrator::new(
            OrchestratorDeps {
                transport,
                transfer,
                sink,
            },
            config,
        )
        .with_cancellation(self.cancel.clone()))
    }
}

/// Bootstrap the CLI application.
///
/// Opens the export, connects (which yields the session greeting) and
/// prepares the cancellation token. The caller decides whether Ctrl-C is
/// wired to the token.
pub async fn bootstrap(config: CliConfig) -> Result<CliContext, CliError> {
    let transport = Arc::new(ExportTransport::open(&config.export_dir).await?);
    let session = transport
        .connect()
        .await
        .map_err(|e| CliError::Core(format!("Failed to open session: {e}")))?;
    debug!(chats = transport.chat_count(), "Export transport ready");

    Ok(CliContext {
        transport,
        session,
        config,
        cancel: CancellationToken::new(),
    })
}
