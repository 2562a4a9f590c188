//! Cross-thread shutdown flag.
//!
//! The signal handler thread (installed by `main` through `ctrlc`) is the
//! only producer; the control loop polls between ticks.
//!
//! ```text
//! ┌──────────────┐  request()   ┌──────────────┐  is_requested()  ┌───────────┐
//! │ SIGINT/TERM  │─────────────▶│  AtomicBool  │◀─────────────────│ Main loop │
//! └──────────────┘              └──────────────┘                  └───────────┘
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Cheaply clonable handle to one shared flag.
#[derive(Debug, Clone, Default)]
pub struct ShutdownSignal {
    flag: Arc<AtomicBool>,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the loop to stop.  Safe to call from any thread, any number of times.
    pub fn request(&self) {
        self.flag.store(true, Ordering::Release);
    }

    pub fn is_requested(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}
