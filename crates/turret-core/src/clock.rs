//! Clock seam.
//!
//! Freshness windows and transaction validity bounds need wall-clock time;
//! threading a clock instead of calling `SystemTime::now` inline lets tests
//! pin time per scenario.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Source of unix time, injected wherever the protocol needs "now".
pub trait Clock: Send + Sync {
    /// Current unix time in whole seconds.
    fn unix_now(&self) -> u64;
}

/// Production clock backed by the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn unix_now(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or(Duration::ZERO)
            .as_secs()
    }
}
