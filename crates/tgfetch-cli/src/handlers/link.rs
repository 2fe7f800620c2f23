//! `tgfetch link`: download the media of one message link.

use std::sync::Arc;

use anyhow::Result;
use tgfetch_core::DownloadSettings;

use crate::bootstrap::CliContext;
use crate::commands::TransferOptions;
use crate::error::CliError;
use crate::presentation::{CliProgressSink, print_outcome};

/// Execute the link command.
///
/// No enumeration and no batching: the message is fetched by ID.
pub async fn execute(ctx: &CliContext, link: &str, types: Option<&str>) -> Result<()> {
    let settings = ctx.settings(DownloadSettings::new(), types, &TransferOptions::default());
    ctx.prepare_destination(&settings)?;

    let sink = Arc::new(CliProgressSink::new());
    let orchestrator = ctx.orchestrator(&settings, sink.clone()).await?;

    let result = orchestrator
        .download_from_link(link, &settings.type_filter)
        .await;
    sink.finish();

    let outcome = result.map_err(CliError::from)?;
    print_outcome(&outcome);
    if let Some(err) = outcome.error() {
        return Err(CliError::Core(err.to_string()).into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::fixtures::fixture;

    #[tokio::test]
    async fn test_downloads_one_message() {
        let fx = fixture().await;
        execute(&fx.ctx, "https://t.me/c/1234567890/3", None)
            .await
            .unwrap();

        let downloads = fx.downloads();
        assert_eq!(downloads.len(), 1);
        assert!(downloads[0].ends_with("_3_handbook.pdf"));
    }

    #[tokio::test]
    async fn test_link_without_message_id_is_usage_error() {
        let fx = fixture().await;
        let err = execute(&fx.ctx, "-1001234567890", None).await.unwrap_err();
        assert_eq!(err.downcast_ref::<CliError>().unwrap().exit_code(), 2);
    }

    #[tokio::test]
    async fn test_filtered_out_message_fails() {
        let fx = fixture().await;
        let err = execute(&fx.ctx, "https://t.me/c/1234567890/2", Some("video"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("no matching media"));
        assert!(fx.downloads().is_empty());
    }
}
