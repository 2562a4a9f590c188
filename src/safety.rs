//! Watchdog supervisor.
//!
//! Owns the armed watchdog device from the moment its timeout is set until
//! the magic-close sequence has been written.
//!
//! ## Lifecycle
//!
//! 1. [`WatchdogSupervisor::arm`] takes an opened device and sets the
//!    timeout.  From here on the board reboots unless kicked.
//! 2. The control loop calls [`kick`](WatchdogSupervisor::kick) once per
//!    tick.  The tick interval is checked up front to be at most half the
//!    timeout, so one slow tick does not cause a spurious reset.
//! 3. On clean shutdown [`disable_and_close`](WatchdogSupervisor::disable_and_close)
//!    consumes the supervisor.
//!
//! If the supervisor is dropped while still armed (an early return or a
//! panic unwinding through the loop) the `Drop` impl writes the disable
//! sequence itself and logs an error.  A device is never leaked open.

use log::{error, info, warn};

use crate::app::ports::WatchdogPort;
use crate::error::WatchdogError;

/// Reject a tick interval that leaves less than a 2× margin.
pub fn check_tick_interval(timeout_secs: u32, tick_ms: u32) -> Result<(), WatchdogError> {
    if timeout_secs == 0 || u64::from(tick_ms) * 2 > u64::from(timeout_secs) * 1000 {
        return Err(WatchdogError::TimeoutTooShort {
            timeout_secs,
            tick_ms,
        });
    }
    Ok(())
}

pub struct WatchdogSupervisor<W: WatchdogPort> {
    device: Option<W>,
    timeout_secs: u32,
    kicks: u64,
}

impl<W: WatchdogPort> WatchdogSupervisor<W> {
    /// Set the hardware timeout on an opened device.
    ///
    /// On failure the device is disarmed before the error is returned.
    pub fn arm(device: W, timeout_secs: u32) -> Result<Self, WatchdogError> {
        let mut sup = Self {
            device: Some(device),
            timeout_secs,
            kicks: 0,
        };

        let effective = sup.device_mut()?.set_timeout(timeout_secs)?;
        if effective != timeout_secs {
            warn!(
                "Watchdog: driver rounded timeout {}s -> {}s",
                timeout_secs, effective
            );
        }
        sup.timeout_secs = effective;
        info!("Watchdog: armed, timeout {}s", effective);
        Ok(sup)
    }

    /// Reset the hardware countdown.
    pub fn kick(&mut self) -> Result<(), WatchdogError> {
        self.device_mut()?.keep_alive()?;
        self.kicks += 1;
        Ok(())
    }

    /// Write the magic-close sequence and release the device.
    pub fn disable_and_close(mut self) -> Result<(), WatchdogError> {
        let device = self.device.take().ok_or(WatchdogError::NotArmed)?;
        device.magic_close()?;
        info!("Watchdog: disabled after {} kicks", self.kicks);
        Ok(())
    }

    pub fn timeout_secs(&self) -> u32 {
        self.timeout_secs
    }

    pub fn kick_count(&self) -> u64 {
        self.kicks
    }

    fn device_mut(&mut self) -> Result<&mut W, WatchdogError> {
        self.device.as_mut().ok_or(WatchdogError::NotArmed)
    }
}

impl<W: WatchdogPort> Drop for WatchdogSupervisor<W> {
    fn drop(&mut self) {
        if let Some(device) = self.device.take() {
            error!("Watchdog: released without shutdown, issuing magic close");
            if let Err(e) = device.magic_close() {
                error!("Watchdog: magic close failed: {}", e);
            }
        }
    }
}
