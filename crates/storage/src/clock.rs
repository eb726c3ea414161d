//! Append clock
//!
//! `created_at` defines FIFO order, so two appends must never share a
//! timestamp and a wall-clock step backwards must not reorder the log.

use chrono::{Duration, Utc};
use distlog_core::Timestamp;
use parking_lot::Mutex;

/// Strictly increasing UTC clock
#[derive(Debug)]
pub struct MonotonicClock {
    last: Mutex<Option<Timestamp>>,
}

impl MonotonicClock {
    /// Create a clock with no history
    pub fn new() -> Self {
        Self {
            last: Mutex::new(None),
        }
    }

    /// Next timestamp: wall-clock now, or one microsecond past the last one
    pub fn tick(&self) -> Timestamp {
        let now = Utc::now();
        let mut last = self.last.lock();
        let next = match *last {
            Some(prev) if now <= prev => prev + Duration::microseconds(1),
            _ => now,
        };
        *last = Some(next);
        next
    }

    /// Never hand out anything at or before `at` (used during recovery)
    pub fn observe(&self, at: Timestamp) {
        let mut last = self.last.lock();
        if last.map_or(true, |prev| at > prev) {
            *last = Some(at);
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}
