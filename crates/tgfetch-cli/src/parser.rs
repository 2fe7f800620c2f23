//! Main CLI parser and top-level argument handling.
//!
//! This module defines the root CLI structure with global options.

use std::path::PathBuf;

use clap::Parser;

use crate::commands::Commands;

/// Download media from Telegram channels, message links and link lists.
#[derive(Parser)]
#[command(name = "tgfetch")]
#[command(about = "Download media from Telegram channels")]
#[command(version)]
pub struct Cli {
    /// Directory downloaded files are written to
    #[arg(long = "dest", global = true, env = "TGFETCH_DEST")]
    pub dest: Option<PathBuf>,

    /// Telegram Desktop export to read channels from
    #[arg(long = "export-dir", global = true, env = "TGFETCH_EXPORT_DIR")]
    pub export_dir: Option<PathBuf>,

    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}
