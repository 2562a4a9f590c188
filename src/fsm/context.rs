//! Shared mutable context threaded through every FSM handler.
//!
//! `FsmContext` is the single struct that state handlers read from and
//! write to.  It holds the latest moisture reading, the pump command for
//! this tick, the monotonic clock, and the open pump session.

use crate::config::LoopSettings;
use crate::sensors::moisture::MoistureReading;

// ---------------------------------------------------------------------------
// Pump command (written by state handlers; consumed by the service)
// ---------------------------------------------------------------------------

/// What the pump should do after this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PumpCommand {
    /// Leave the output as it is.
    #[default]
    Unchanged,
    On,
    Off,
}

// ---------------------------------------------------------------------------
// Pump session
// ---------------------------------------------------------------------------

/// One contiguous watering period, from entering Dry until leaving it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PumpSession {
    pub started_ms: u64,
    pub stopped_ms: u64,
    /// Estimated volume at the configured flow rate.
    pub millilitres: u64,
}

impl PumpSession {
    pub fn new(started_ms: u64, stopped_ms: u64, flow_ml_per_sec: u32) -> Self {
        let elapsed = stopped_ms.saturating_sub(started_ms);
        Self {
            started_ms,
            stopped_ms,
            millilitres: elapsed * u64::from(flow_ml_per_sec) / 1000,
        }
    }

    pub fn duration_ms(&self) -> u64 {
        self.stopped_ms.saturating_sub(self.started_ms)
    }
}

// ---------------------------------------------------------------------------
// FsmContext
// ---------------------------------------------------------------------------

/// The shared context passed to every state handler function.
pub struct FsmContext {
    // -- Timing --
    /// Monotonic milliseconds at the start of this tick.
    pub now_ms: u64,

    // -- Sensor data --
    /// Latest moisture reading.  Updated before each FSM tick.
    pub reading: MoistureReading,

    // -- Actuator output --
    pub pump_command: PumpCommand,

    // -- Configuration --
    pub settings: LoopSettings,

    // -- Session bookkeeping --
    /// Set on entering Dry, taken on leaving it.
    pub pump_started_ms: Option<u64>,
    /// Closed session waiting to be written to the statistics file.
    pub completed_session: Option<PumpSession>,
}

impl FsmContext {
    pub fn new(settings: LoopSettings) -> Self {
        Self {
            now_ms: 0,
            reading: MoistureReading::NotDry,
            pump_command: PumpCommand::Unchanged,
            settings,
            pump_started_ms: None,
            completed_session: None,
        }
    }

    /// Drain the pump command, leaving `Unchanged` behind.
    pub fn take_pump_command(&mut self) -> PumpCommand {
        core::mem::take(&mut self.pump_command)
    }

    pub fn take_session(&mut self) -> Option<PumpSession> {
        self.completed_session.take()
    }

    /// Close the open session, if any, at the current time.
    pub(crate) fn close_session(&mut self) {
        if let Some(started) = self.pump_started_ms.take() {
            self.completed_session = Some(PumpSession::new(
                started,
                self.now_ms,
                self.settings.pump_flow_ml_per_sec,
            ));
        }
    }
}
