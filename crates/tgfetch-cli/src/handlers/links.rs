//! `tgfetch links`: download every message link listed in a file.

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use tgfetch_core::DownloadSettings;
use tgfetch_download::read_locator_file;

use super::ensure_complete;
use crate::bootstrap::CliContext;
use crate::commands::TransferOptions;
use crate::error::CliError;
use crate::presentation::{CliProgressSink, print_run_report};

/// Execute the links command.
///
/// Links that cannot be parsed, resolved or fetched count as failed items
/// and end up in the failure ledger together with failed transfers.
pub async fn execute(ctx: &CliContext, file: &Path, options: &TransferOptions) -> Result<()> {
    let links = read_locator_file(file).await.map_err(CliError::from)?;
    if links.is_empty() {
        println!("No links found in {}", file.display());
        return Ok(());
    }

    let settings = ctx.settings(
        DownloadSettings::for_links(),
        options.types.as_deref(),
        options,
    );
    ctx.prepare_destination(&settings)?;

    let sink = Arc::new(CliProgressSink::new());
    let orchestrator = ctx.orchestrator(&settings, sink.clone()).await?;

    println!(
        "Downloading {} link(s) from {} in batches of {}",
        links.len(),
        file.display(),
        orchestrator.config().batch_size
    );
    let result = orchestrator
        .download_links(links, &settings.type_filter)
        .await;
    sink.finish();

    let report = result.map_err(CliError::from)?;
    print_run_report(&report);
    ensure_complete(&report.summary)?;
    Ok(())
}
