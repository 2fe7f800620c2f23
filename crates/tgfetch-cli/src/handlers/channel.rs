//! `tgfetch channel`: download the matching media of a whole channel.

use std::sync::Arc;

use anyhow::Result;
use tgfetch_core::DownloadSettings;

use super::{ensure_complete, scan_limit};
use crate::bootstrap::CliContext;
use crate::commands::TransferOptions;
use crate::error::CliError;
use crate::presentation::{CliProgressSink, print_run_report};

/// Channel command arguments passed from CLI.
pub struct ChannelArgs<'a> {
    pub locator: &'a str,
    pub limit: Option<u64>,
    pub options: &'a TransferOptions,
}

/// Execute the channel command.
pub async fn execute(ctx: &CliContext, args: ChannelArgs<'_>) -> Result<()> {
    let settings = ctx.settings(
        DownloadSettings::new().with_scan_limit(scan_limit(args.limit)),
        args.options.types.as_deref(),
        args.options,
    );
    ctx.prepare_destination(&settings)?;

    let sink = Arc::new(CliProgressSink::new());
    let orchestrator = ctx.orchestrator(&settings, sink.clone()).await?;

    println!(
        "Downloading {} media from {} into {}",
        settings.type_filter,
        args.locator,
        settings.destination.display()
    );
    let result = orchestrator
        .download_channel(args.locator, &settings.type_filter, settings.scan_limit)
        .await;
    sink.finish();

    let report = result.map_err(CliError::from)?;
    print_run_report(&report);
    ensure_complete(&report.summary)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::fixtures::{fixture, quick_options};

    #[tokio::test]
    async fn test_unavailable_media_fails_the_run_and_is_persisted() {
        let fx = fixture().await;
        let options = quick_options();
        let err = execute(
            &fx.ctx,
            ChannelArgs {
                locator: "https://t.me/c/1234567890",
                limit: None,
                options: &options,
            },
        )
        .await
        .unwrap_err();

        let cli_err = err.downcast_ref::<CliError>().unwrap();
        assert!(matches!(cli_err, CliError::Incomplete { failed: 1, .. }));

        let downloads = fx.downloads();
        assert_eq!(downloads.len(), 2);
        assert!(downloads.iter().any(|n| n.ends_with("_2.jpg")));
        assert!(downloads.iter().any(|n| n.ends_with("_3_handbook.pdf")));

        let ledgers = fx.ledger_files("failed_links_");
        assert_eq!(ledgers.len(), 1);
        let contents = std::fs::read_to_string(&ledgers[0]).unwrap();
        assert_eq!(contents.trim(), "https://t.me/c/1234567890/4");
    }

    #[tokio::test]
    async fn test_type_filter_limits_the_run() {
        let fx = fixture().await;
        let options = TransferOptions {
            types: Some("pdf".to_string()),
            ..quick_options()
        };
        execute(
            &fx.ctx,
            ChannelArgs {
                locator: "-1001234567890",
                limit: None,
                options: &options,
            },
        )
        .await
        .unwrap();

        let downloads = fx.downloads();
        assert_eq!(downloads.len(), 1);
        assert!(downloads[0].ends_with("_3_handbook.pdf"));
        assert!(fx.ledger_files("failed_links_").is_empty());
    }

    #[tokio::test]
    async fn test_unknown_channel_is_not_found() {
        let fx = fixture().await;
        let options = quick_options();
        let err = execute(
            &fx.ctx,
            ChannelArgs {
                locator: "nosuchchannel",
                limit: None,
                options: &options,
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.downcast_ref::<CliError>().unwrap().exit_code(), 1);
        assert!(matches!(
            err.downcast_ref::<CliError>(),
            Some(CliError::NotFound(_))
        ));
    }
}
