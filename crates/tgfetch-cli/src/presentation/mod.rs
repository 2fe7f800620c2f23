//! Shared CLI presentation utilities.
//!
//! Keep this module format-only: counting and classification happen in
//! `tgfetch-download`, this code only renders what it reports.

pub mod progress;
pub mod summary;

pub use progress::CliProgressSink;
pub use summary::{
    format_size, print_media_links, print_outcome, print_run_report, print_separator,
    summary_lines, truncate_string,
};
