//! `tgfetch` command-line front-end.
//!
//! The binary in `main.rs` parses arguments and hands them to the
//! composition root in [`bootstrap`]; every command handler receives the
//! resulting [`CliContext`] and delegates the real work to
//! `tgfetch-download`.

#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

pub mod bootstrap;
pub mod commands;
pub mod error;
pub mod handlers;
pub mod parser;
pub mod presentation;
pub mod utils;

pub use bootstrap::{CliConfig, CliContext, bootstrap, init_tracing, load_env};
pub use commands::{Commands, TransferOptions};
pub use error::CliError;
pub use parser::Cli;
