//! Destination directory handling.
//!
//! Non-interactive: adapters ask the user before calling in, if they ask at all.

mod destination;
mod error;

pub use destination::{MissingDirectory, prepare_destination};
pub use error::PathError;
