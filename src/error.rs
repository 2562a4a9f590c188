//! Unified error types for the irrigation controller.
//!
//! A single `Error` enum that every subsystem converts into, keeping the
//! control loop's error handling uniform.  All variants are `Copy` so they
//! can be passed through the service and FSM without allocation.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Every fallible operation in the controller funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A GPIO operation was rejected or the register window is gone.
    Gpio(GpioError),
    /// The watchdog device could not be opened or driven.
    Watchdog(WatchdogError),
    /// Configuration could not be loaded or is unusable.
    Config(ConfigError),
    /// Peripheral initialisation failed.
    Init(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gpio(e) => write!(f, "gpio: {e}"),
            Self::Watchdog(e) => write!(f, "watchdog: {e}"),
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Init(msg) => write!(f, "init: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// GPIO errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GpioError {
    /// No register window is mapped (never opened, or already released).
    NotInitialised,
    /// Pin number outside the usable range.
    InvalidPin(u8),
    /// Word index outside the register window.
    RegisterOutOfRange(usize),
}

impl fmt::Display for GpioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotInitialised => write!(f, "GPIO has not been initialised"),
            Self::InvalidPin(pin) => write!(f, "pin {pin} is not a valid GPIO pin"),
            Self::RegisterOutOfRange(idx) => {
                write!(f, "register index {idx} outside the GPIO window")
            }
        }
    }
}

impl std::error::Error for GpioError {}

impl From<GpioError> for Error {
    fn from(e: GpioError) -> Self {
        Self::Gpio(e)
    }
}

impl embedded_hal::digital::Error for GpioError {
    fn kind(&self) -> embedded_hal::digital::ErrorKind {
        embedded_hal::digital::ErrorKind::Other
    }
}

// ---------------------------------------------------------------------------
// Watchdog errors
// ---------------------------------------------------------------------------

/// `errno` values are carried so the variant stays `Copy`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchdogError {
    /// The device node could not be opened.
    Open(i32),
    /// `WDIOC_SETTIMEOUT` failed.
    SetTimeout(i32),
    /// `WDIOC_KEEPALIVE` failed.
    KeepAlive(i32),
    /// Writing the magic-close byte failed.
    MagicClose(i32),
    /// Operation on a watchdog that is no longer armed.
    NotArmed,
    /// The tick interval leaves no margin inside the watchdog timeout.
    TimeoutTooShort { timeout_secs: u32, tick_ms: u32 },
}

impl fmt::Display for WatchdogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open(errno) => write!(f, "couldn't open watchdog device (errno {errno})"),
            Self::SetTimeout(errno) => write!(f, "couldn't set timeout (errno {errno})"),
            Self::KeepAlive(errno) => write!(f, "keep-alive failed (errno {errno})"),
            Self::MagicClose(errno) => write!(f, "magic close failed (errno {errno})"),
            Self::NotArmed => write!(f, "watchdog is not armed"),
            Self::TimeoutTooShort {
                timeout_secs,
                tick_ms,
            } => write!(
                f,
                "timeout {timeout_secs}s must be at least twice the {tick_ms}ms tick"
            ),
        }
    }
}

impl std::error::Error for WatchdogError {}

impl From<WatchdogError> for Error {
    fn from(e: WatchdogError) -> Self {
        Self::Watchdog(e)
    }
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// The config file could not be opened or read.
    Unreadable,
    /// No usable watchdog timeout (zero arms the watchdog with no grace).
    ZeroTimeout,
    /// No log file path was configured.
    MissingLogPath,
    /// No statistics file path was configured.
    MissingStatPath,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unreadable => write!(f, "the config file could not be opened"),
            Self::ZeroTimeout => write!(f, "watchdog timeout is missing or zero"),
            Self::MissingLogPath => write!(f, "log file path is missing"),
            Self::MissingStatPath => write!(f, "stat file path is missing"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;

/// Last OS error as a raw `errno`, 0 if unavailable.
#[cfg(feature = "hw")]
pub(crate) fn last_errno() -> i32 {
    std::io::Error::last_os_error().raw_os_error().unwrap_or(0)
}
