//! Outbound application events.
//!
//! The service and controller emit these through the
//! [`EventSink`](super::ports::EventSink) port.  The file sink turns most of
//! them into timestamped log lines; [`AppEvent::PumpSession`] goes to the
//! statistics file instead.

use crate::config::ConfigWarning;
use crate::error::Error;
use crate::fsm::StateId;
use crate::fsm::context::PumpSession;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// A config line was ignored or degraded while parsing.
    ConfigWarning(ConfigWarning),

    /// The GPIO register window is mapped.
    GpioInitialised,
    /// A pin was switched to output mode.
    PinConfigured(u8),
    /// The watchdog device node is open.
    WatchdogOpened,
    /// The watchdog is armed with this timeout (seconds).
    WatchdogTimeoutSet(u32),

    /// The application service has started (carries initial state).
    Started(StateId),
    /// The FSM transitioned between states.
    StateChanged { from: StateId, to: StateId },
    /// A watering period ended.
    PumpSession(PumpSession),
    /// A sensor read or pump write failed this tick.
    HardwareFault(Error),

    WatchdogKicked,
    /// A termination signal was observed.
    ShutdownRequested,
    WatchdogDisabled,
    WatchdogClosed,
    GpioFreed,
}
