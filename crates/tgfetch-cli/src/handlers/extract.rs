//! `tgfetch extract`: list a channel's matching media as message links.

use std::sync::Arc;

use anyhow::Result;
use tgfetch_core::{DownloadSettings, NoopTransferSink};
use tgfetch_download::save_media_links;

use super::scan_limit;
use crate::bootstrap::CliContext;
use crate::commands::TransferOptions;
use crate::error::CliError;
use crate::presentation::print_media_links;
use crate::utils::input;

/// Extract command arguments passed from CLI.
pub struct ExtractArgs<'a> {
    pub locator: &'a str,
    pub types: Option<&'a str>,
    pub limit: Option<u64>,
    /// Save without asking. When unset, an interactive terminal is asked.
    pub save: bool,
}

/// Execute the extract command.
pub async fn execute(ctx: &CliContext, args: ExtractArgs<'_>) -> Result<()> {
    let settings = ctx.settings(
        DownloadSettings::new().with_scan_limit(scan_limit(args.limit)),
        args.types,
        &TransferOptions::default(),
    );
    let orchestrator = ctx
        .orchestrator(&settings, Arc::new(NoopTransferSink))
        .await?;

    let resolved = orchestrator
        .resolver()
        .resolve(args.locator)
        .await
        .map_err(CliError::from)?;
    println!(
        "Scanning {} ({}) for {} media",
        resolved.entity.title, resolved.reference, settings.type_filter
    );

    let links = orchestrator
        .collect_links(&resolved, &settings.type_filter, settings.scan_limit)
        .await
        .map_err(CliError::from)?;
    print_media_links(&links);
    if links.is_empty() {
        return Ok(());
    }

    let save = args.save
        || (input::is_interactive() && input::prompt_confirmation("Save links to file?")?);
    if save {
        let path = save_media_links(&settings.ledger_dir, &links)
            .await
            .map_err(CliError::from)?;
        println!("Links saved to {}", path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::fixtures::fixture;

    #[tokio::test]
    async fn test_saves_matching_links() {
        let fx = fixture().await;
        execute(
            &fx.ctx,
            ExtractArgs {
                locator: "-1001234567890",
                types: Some("video,pdf"),
                limit: None,
                save: true,
            },
        )
        .await
        .unwrap();

        let files = fx.ledger_files("media_links_");
        assert_eq!(files.len(), 1);
        let contents = std::fs::read_to_string(&files[0]).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(
            lines,
            vec!["https://t.me/c/1234567890/4", "https://t.me/c/1234567890/3"]
        );
        assert!(fx.downloads().is_empty());
    }
}
