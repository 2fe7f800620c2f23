//! Run summaries and tables for CLI output.

use indicatif::HumanBytes;
use tgfetch_core::{RunSummary, TransferOutcome, TransferStatus};
use tgfetch_download::{MediaLink, RunReport};

/// Truncates a string to a maximum length in characters, adding "..." if needed.
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}

/// Print a horizontal separator line.
pub fn print_separator(width: usize) {
    println!("{}", "-".repeat(width));
}

/// Human-readable size, or "?" when unknown.
pub fn format_size(size: Option<u64>) -> String {
    size.map_or_else(|| "?".to_string(), |bytes| HumanBytes(bytes).to_string())
}

/// The lines describing a run's final counts.
pub fn summary_lines(summary: &RunSummary) -> Vec<String> {
    let mut lines = vec![
        format!("Total:           {}", summary.total),
        format!(
            "Succeeded:       {} ({} already present)",
            summary.succeeded, summary.already_present
        ),
        format!("Failed:          {}", summary.failed),
    ];
    if summary.not_attempted > 0 || summary.cancelled {
        lines.push(format!("Not attempted:   {}", summary.not_attempted));
    }
    lines
}

/// Print the outcome of a batch run.
pub fn print_run_report(report: &RunReport) {
    println!();
    if report.summary.cancelled {
        println!("Run interrupted.");
    } else if report.summary.is_clean() {
        println!("✓ Download complete.");
    } else {
        println!("Download finished with failures.");
    }
    print_separator(40);
    for line in summary_lines(&report.summary) {
        println!("{line}");
    }
    if report.retry_rounds > 0 {
        println!("Retry rounds:    {}", report.retry_rounds);
    }

    let failed = report.ledger.failed();
    if !failed.is_empty() {
        println!();
        println!("Failed items:");
        for outcome in failed {
            let reason = outcome
                .error()
                .map_or_else(String::new, ToString::to_string);
            println!(
                "  {}  {}",
                outcome.job.locator(),
                truncate_string(&reason, 80)
            );
        }
    }

    if let Some(path) = &report.ledger_file {
        println!();
        println!("Unfinished links saved to: {}", path.display());
        println!("Retry them with: tgfetch links {}", path.display());
    }
}

/// Print the outcome of a single-message download.
pub fn print_outcome(outcome: &TransferOutcome) {
    let path = outcome
        .local_path
        .as_ref()
        .map_or_else(String::new, |p| p.display().to_string());
    match &outcome.status {
        TransferStatus::Transferred => println!("✓ Downloaded to {path}"),
        TransferStatus::AlreadyPresent => println!("✓ Already present: {path}"),
        TransferStatus::Failed(err) => println!("✗ {}: {err}", outcome.job.locator()),
    }
}

/// Print extracted media links as a table.
pub fn print_media_links(links: &[MediaLink]) {
    println!("{:<45} {:<10} {:>10}  NAME", "LINK", "TYPE", "SIZE");
    print_separator(80);
    for link in links {
        println!(
            "{:<45} {:<10} {:>10}  {}",
            truncate_string(&link.link, 45),
            link.kind,
            format_size(link.size),
            link.file_name.as_deref().unwrap_or("-")
        );
    }
    println!();
    println!("{} media message(s) found", links.len());
}
