//! Application service, the hexagonal core.
//!
//! [`IrrigationService`] owns the FSM and its shared context.  It exposes
//! a hardware-agnostic API; all I/O flows through port traits injected at
//! call sites, so the whole service is testable with mock adapters.
//!
//! ```text
//!  SensorPort ──▶ ┌──────────────────────────┐ ──▶ EventSink
//!                 │   IrrigationService      │
//! ActuatorPort ◀──│   FSM · pump sessions    │
//!                 └──────────────────────────┘
//! ```

use log::{info, warn};

use crate::config::LoopSettings;
use crate::error::Error;
use crate::fsm::context::{FsmContext, PumpCommand};
use crate::fsm::states::build_state_table;
use crate::fsm::{Fsm, StateId};
use crate::sensors::moisture::MoistureReading;

use super::events::AppEvent;
use super::ports::{ActuatorPort, EventSink, SensorPort};

// ───────────────────────────────────────────────────────────────
// IrrigationService
// ───────────────────────────────────────────────────────────────

pub struct IrrigationService {
    fsm: Fsm,
    ctx: FsmContext,
    tick_count: u64,
    sessions: u64,
    millilitres_total: u64,
}

impl IrrigationService {
    /// Construct the service.  Does **not** start the FSM; call [`start`](Self::start).
    pub fn new(settings: LoopSettings) -> Self {
        Self {
            fsm: Fsm::new(build_state_table(), StateId::Start),
            ctx: FsmContext::new(settings),
            tick_count: 0,
            sessions: 0,
            millilitres_total: 0,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    pub fn start(&mut self, sink: &mut impl EventSink) {
        self.fsm.start(&mut self.ctx);
        sink.emit(&AppEvent::Started(self.fsm.current_state()));
        info!("IrrigationService started in {:?}", self.fsm.current_state());
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one control cycle: read sensor → FSM → pump → events.
    ///
    /// `hw` satisfies **both** [`SensorPort`] and [`ActuatorPort`], which
    /// avoids a double mutable borrow while keeping the port boundary
    /// explicit.  Hardware errors are reported and the tick carries on.
    pub fn tick(
        &mut self,
        now_ms: u64,
        hw: &mut (impl SensorPort + ActuatorPort),
        sink: &mut impl EventSink,
    ) {
        if self.fsm.current_state().is_terminal() {
            return;
        }
        self.tick_count += 1;
        let prev_state = self.fsm.current_state();

        // 1. Read sensor.  A failed read never starts the pump.
        self.ctx.reading = match hw.read_moisture() {
            Ok(reading) => reading,
            Err(e) => {
                warn!("Moisture read failed: {}", e);
                sink.emit(&AppEvent::HardwareFault(Error::Gpio(e)));
                MoistureReading::NotDry
            }
        };
        self.ctx.now_ms = now_ms;

        // 2. FSM tick (pure state logic)
        self.fsm.tick(&mut self.ctx);

        // 3. Apply the pump command and flush any closed session
        self.apply_actuators(hw, sink);
        self.flush_session(sink);

        // 4. Emit state change if the FSM moved
        self.emit_transition(prev_state, sink);
    }

    /// Drive the FSM to `Done`: pump off, open session recorded.
    /// Calling it again is a no-op.
    pub fn shutdown(&mut self, now_ms: u64, hw: &mut impl ActuatorPort, sink: &mut impl EventSink) {
        let prev_state = self.fsm.current_state();
        if prev_state.is_terminal() {
            return;
        }
        sink.emit(&AppEvent::ShutdownRequested);
        self.ctx.now_ms = now_ms;
        self.fsm.force_transition(StateId::Done, &mut self.ctx);
        self.apply_actuators(hw, sink);
        self.flush_session(sink);
        self.emit_transition(prev_state, sink);
        info!(
            "IrrigationService stopped after {} ticks, {} sessions, ~{} mL",
            self.tick_count, self.sessions, self.millilitres_total
        );
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn state(&self) -> StateId {
        self.fsm.current_state()
    }

    /// Total control ticks executed since startup.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Completed watering sessions since startup.
    pub fn session_count(&self) -> u64 {
        self.sessions
    }

    pub fn millilitres_total(&self) -> u64 {
        self.millilitres_total
    }

    // ── Internal ──────────────────────────────────────────────

    fn apply_actuators(&mut self, hw: &mut impl ActuatorPort, sink: &mut impl EventSink) {
        let result = match self.ctx.take_pump_command() {
            PumpCommand::Unchanged => return,
            PumpCommand::On => hw.set_pump(true),
            PumpCommand::Off => hw.set_pump(false),
        };
        if let Err(e) = result {
            warn!("Pump write failed: {}", e);
            sink.emit(&AppEvent::HardwareFault(Error::Gpio(e)));
        }
    }

    fn flush_session(&mut self, sink: &mut impl EventSink) {
        if let Some(session) = self.ctx.take_session() {
            self.sessions += 1;
            self.millilitres_total += session.millilitres;
            sink.emit(&AppEvent::PumpSession(session));
        }
    }

    fn emit_transition(&self, from: StateId, sink: &mut impl EventSink) {
        let to = self.fsm.current_state();
        if to != from {
            sink.emit(&AppEvent::StateChanged { from, to });
        }
    }
}
