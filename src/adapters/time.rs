//! Monotonic time adapter.
//!
//! Wraps `std::time::Instant`, so wall-clock changes (NTP, manual `date`)
//! never distort pump-session durations.

use core::time::Duration;
use std::time::Instant;

use crate::app::ports::TimePort;

pub struct MonotonicClock {
    start: Instant,
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl TimePort for MonotonicClock {
    fn uptime_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }

    fn sleep(&mut self, period: Duration) {
        std::thread::sleep(period);
    }
}
