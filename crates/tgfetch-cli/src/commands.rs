//! Main commands enum and shared transfer options.

use std::path::PathBuf;

use clap::{Args, Subcommand};

/// Available commands.
///
/// Every command accepts any locator form: `@username`, `t.me` links,
/// private `t.me/c/...` links, numeric IDs and web-client URLs.
#[derive(Subcommand)]
pub enum Commands {
    /// Download matching media from a whole channel
    Channel {
        /// Channel username, link or numeric ID (signed IDs such as -1001234567890 work)
        #[arg(allow_negative_numbers = true)]
        locator: String,
        /// Maximum number of messages to scan (default: all)
        #[arg(short, long, value_parser = clap::value_parser!(u64).range(1..))]
        limit: Option<u64>,
        #[command(flatten)]
        options: TransferOptions,
    },

    /// Download the media of a single message link
    Link {
        /// Message link such as https://t.me/examplechan/42
        link: String,
        /// Media types to accept (comma-separated, e.g. "video,pdf")
        #[arg(short, long)]
        types: Option<String>,
    },

    /// Download every message link listed in a file
    ///
    /// One link per line; blank lines are ignored. A failure ledger written
    /// by a previous run is a valid input.
    Links {
        /// Path to the links file
        file: PathBuf,
        #[command(flatten)]
        options: TransferOptions,
    },

    /// List matching media of a channel as message links
    Extract {
        /// Channel username, link or numeric ID (signed IDs such as -1001234567890 work)
        #[arg(allow_negative_numbers = true)]
        locator: String,
        /// Media types to list (comma-separated, e.g. "video,pdf")
        #[arg(short, long)]
        types: Option<String>,
        /// Maximum number of messages to scan (default: all)
        #[arg(short, long, value_parser = clap::value_parser!(u64).range(1..))]
        limit: Option<u64>,
        /// Save the links to a media_links_<timestamp>.txt file
        #[arg(long)]
        save: bool,
    },
}

/// Options shared by the batch download commands.
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct TransferOptions {
    /// Media types to download (comma-separated, e.g. "video,pdf")
    #[arg(short, long)]
    pub types: Option<String>,

    /// Concurrent downloads per batch (1-100)
    #[arg(short, long, value_parser = clap::value_parser!(u64).range(1..=100))]
    pub batch_size: Option<u64>,

    /// Retry rounds over failed items
    #[arg(long)]
    pub max_retries: Option<u32>,

    /// Seconds to wait before each retry round
    #[arg(long)]
    pub retry_delay: Option<u64>,

    /// Skip messages whose file already exists in the destination
    #[arg(long)]
    pub resume: bool,
}
