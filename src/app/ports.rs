//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ IrrigationService (domain)
//! ```
//!
//! Driven adapters (GPIO, watchdog, log files, clock) implement these
//! traits.  The [`IrrigationService`](super::service::IrrigationService)
//! and the [`Controller`](crate::controller::Controller) consume them via
//! generics, so the domain core never touches `/dev` directly.

use core::time::Duration;

use crate::error::{GpioError, WatchdogError};
use crate::sensors::moisture::MoistureReading;

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port: the domain calls this once per tick.
pub trait SensorPort {
    fn read_moisture(&mut self) -> Result<MoistureReading, GpioError>;
}

// ───────────────────────────────────────────────────────────────
// Actuator port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port: the domain calls this to command the pump.
pub trait ActuatorPort {
    /// Drive the pump relay.  Idempotent.
    fn set_pump(&mut self, on: bool) -> Result<(), GpioError>;

    /// Kill all actuators for a safe shutdown.
    fn all_off(&mut self) -> Result<(), GpioError> {
        self.set_pump(false)
    }
}

// ───────────────────────────────────────────────────────────────
// Watchdog port (driven adapter: domain → kernel timer)
// ───────────────────────────────────────────────────────────────

/// A hardware watchdog that reboots the board unless kicked.
pub trait WatchdogPort {
    /// Request a timeout.  Returns the value the driver actually applied.
    fn set_timeout(&mut self, secs: u32) -> Result<u32, WatchdogError>;

    fn keep_alive(&mut self) -> Result<(), WatchdogError>;

    /// Disarm the timer and release the device.
    fn magic_close(self) -> Result<(), WatchdogError>;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → log / stat files)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Time port
// ───────────────────────────────────────────────────────────────

/// Monotonic time source and loop pacing.
pub trait TimePort {
    /// Milliseconds since the clock was created.  Never goes backwards.
    fn uptime_ms(&self) -> u64;

    /// Block the loop for `period`.
    fn sleep(&mut self, period: Duration);
}
