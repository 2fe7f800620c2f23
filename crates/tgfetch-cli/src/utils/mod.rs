//! Terminal helpers shared by handlers.

pub mod input;
pub mod signal;
