//! Kernel hardware watchdog driver (`/dev/watchdog`).
//!
//! Once the device node is opened the hardware timer is running: if no
//! keep-alive arrives within the timeout the board resets.  The only way to
//! stop it is the magic-close sequence (write `V`, then close).
//!
//! ## Dual-target design
//!
//! With the `hw` feature: [`LinuxWatchdog`] issues the real ioctls.
//! On host/test: [`SimWatchdog`] records what would have been sent.

use log::info;

use crate::app::ports::WatchdogPort;
use crate::error::WatchdogError;

#[cfg(feature = "hw")]
pub use linux::LinuxWatchdog;

#[cfg(feature = "hw")]
mod linux {
    use std::fs::{File, OpenOptions};
    use std::io::Write;
    use std::os::unix::fs::OpenOptionsExt;
    use std::os::unix::io::AsRawFd;

    use log::info;

    use crate::app::ports::WatchdogPort;
    use crate::error::{WatchdogError, last_errno};

    // <linux/watchdog.h>: _IOR('W', 5, int) and _IOWR('W', 6, int)
    const WDIOC_KEEPALIVE: libc::c_ulong = 0x8004_5705;
    const WDIOC_SETTIMEOUT: libc::c_ulong = 0xC004_5706;

    const MAGIC_CLOSE: &[u8] = b"V";

    pub struct LinuxWatchdog {
        file: File,
    }

    impl LinuxWatchdog {
        /// Open the device.  The timer starts counting as soon as this
        /// returns `Ok`.
        pub fn open(path: &str) -> Result<Self, WatchdogError> {
            let file = OpenOptions::new()
                .read(true)
                .write(true)
                .custom_flags(libc::O_NOCTTY)
                .open(path)
                .map_err(|e| WatchdogError::Open(e.raw_os_error().unwrap_or(0)))?;
            info!("Watchdog: opened {}", path);
            Ok(Self { file })
        }
    }

    impl WatchdogPort for LinuxWatchdog {
        fn set_timeout(&mut self, secs: u32) -> Result<u32, WatchdogError> {
            let mut timeout = libc::c_int::try_from(secs).unwrap_or(libc::c_int::MAX);
            // SAFETY: WDIOC_SETTIMEOUT reads and writes back one c_int.
            let rc = unsafe {
                libc::ioctl(self.file.as_raw_fd(), WDIOC_SETTIMEOUT as _, &mut timeout)
            };
            if rc < 0 {
                return Err(WatchdogError::SetTimeout(last_errno()));
            }
            Ok(u32::try_from(timeout).unwrap_or(secs))
        }

        fn keep_alive(&mut self) -> Result<(), WatchdogError> {
            let mut dummy: libc::c_int = 0;
            // SAFETY: WDIOC_KEEPALIVE ignores its argument; a valid c_int
            // pointer is passed for drivers that touch it anyway.
            let rc = unsafe {
                libc::ioctl(self.file.as_raw_fd(), WDIOC_KEEPALIVE as _, &mut dummy)
            };
            if rc < 0 {
                return Err(WatchdogError::KeepAlive(last_errno()));
            }
            Ok(())
        }

        fn magic_close(mut self) -> Result<(), WatchdogError> {
            self.file
                .write_all(MAGIC_CLOSE)
                .map_err(|e| WatchdogError::MagicClose(e.raw_os_error().unwrap_or(0)))?;
            // Closing the descriptor right after `V` disarms the timer.
            drop(self.file);
            Ok(())
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Simulation
// ───────────────────────────────────────────────────────────────

/// Host-side stand-in that only counts.
#[derive(Debug, Default)]
pub struct SimWatchdog {
    pub timeout_secs: u32,
    pub keep_alives: u64,
}

impl SimWatchdog {
    pub fn new() -> Self {
        info!("Watchdog(sim): no hardware timer");
        Self::default()
    }
}

impl WatchdogPort for SimWatchdog {
    fn set_timeout(&mut self, secs: u32) -> Result<u32, WatchdogError> {
        self.timeout_secs = secs;
        Ok(secs)
    }

    fn keep_alive(&mut self) -> Result<(), WatchdogError> {
        self.keep_alives += 1;
        Ok(())
    }

    fn magic_close(self) -> Result<(), WatchdogError> {
        info!("Watchdog(sim): closed after {} keep-alives", self.keep_alives);
        Ok(())
    }
}
