//! Byte-progress throttle.
//!
//! Transports report progress per written chunk. One item's updates are
//! thinned out to at most one every [`PROGRESS_INTERVAL`], except the update
//! that completes the item.

use std::time::{Duration, Instant};

/// Minimum gap between two progress events of the same item.
pub const PROGRESS_INTERVAL: Duration = Duration::from_millis(100);

/// Per-item gate for `ItemProgress` events.
#[derive(Debug)]
pub struct ProgressThrottle {
    interval: Duration,
    next_due: Option<Instant>,
}

impl ProgressThrottle {
    pub const fn with_interval(interval: Duration) -> Self {
        Self {
            interval,
            next_due: None,
        }
    }

    /// Decide whether the update `downloaded` of `total` bytes goes out.
    ///
    /// The first update and the completing one (`downloaded >= total`, with a
    /// known total) always pass. A pass pushes the next due time forward.
    pub fn admit(&mut self, downloaded: u64, total: u64) -> bool {
        let now = Instant::now();
        let complete = total > 0 && downloaded >= total;
        if !complete && self.next_due.is_some_and(|due| now < due) {
            return false;
        }
        self.next_due = Some(now + self.interval);
        true
    }
}

impl Default for ProgressThrottle {
    fn default() -> Self {
        Self::with_interval(PROGRESS_INTERVAL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn burst_of_chunks_yields_one_update() {
        let mut throttle = ProgressThrottle::with_interval(Duration::from_secs(60));
        let passed = (1..=50_u64)
            .filter(|chunk| throttle.admit(chunk * 1024, 100 * 1024))
            .count();
        assert_eq!(passed, 1);
    }

    #[test]
    fn completing_update_is_never_dropped() {
        let mut throttle = ProgressThrottle::with_interval(Duration::from_secs(60));
        assert!(throttle.admit(10, 100));
        assert!(!throttle.admit(50, 100));
        assert!(throttle.admit(100, 100));
    }

    #[test]
    fn unknown_total_is_not_completion() {
        let mut throttle = ProgressThrottle::with_interval(Duration::from_secs(60));
        assert!(throttle.admit(0, 0));
        assert!(!throttle.admit(0, 0));
    }

    #[test]
    fn zero_interval_admits_everything() {
        let mut throttle = ProgressThrottle::with_interval(Duration::ZERO);
        assert!((1..=5).all(|n| throttle.admit(n, 10)));
    }
}
