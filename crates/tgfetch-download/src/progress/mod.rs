//! Progress tracking and throttling.
//!
//! Byte-level progress from the transport is rate-limited here before it
//! becomes an `ItemProgress` event.

mod throttle;

pub use throttle::{PROGRESS_INTERVAL, ProgressThrottle};
