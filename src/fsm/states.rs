//! Concrete state handler functions and table builder.
//!
//! ```text
//!  START ──[any]──▶ WET ──[dry]──▶ DRY ──[not dry]──▶ WET
//!                    ▲ │            │ ▲
//!                    └─┘[not dry]   └─┘[dry]
//!
//!  Any state ──[shutdown]──▶ DONE
//! ```
//!
//! Shutdown is not decided here: the service forces `Done` and the
//! normal exit/enter hooks close the session and stop the pump.

use super::context::{FsmContext, PumpCommand};
use super::{StateDescriptor, StateId};
use log::info;

// ═══════════════════════════════════════════════════════════════════════════
//  Table builder
// ═══════════════════════════════════════════════════════════════════════════

/// Build the static state table.  Called once at startup.
pub fn build_state_table() -> [StateDescriptor; StateId::COUNT] {
    [
        // Index 0: Start
        StateDescriptor {
            id: StateId::Start,
            name: "Start",
            on_enter: None,
            on_exit: None,
            on_update: start_update,
        },
        // Index 1: Wet
        StateDescriptor {
            id: StateId::Wet,
            name: "Wet",
            on_enter: Some(wet_enter),
            on_exit: None,
            on_update: wet_update,
        },
        // Index 2: Dry
        StateDescriptor {
            id: StateId::Dry,
            name: "Dry",
            on_enter: Some(dry_enter),
            on_exit: Some(dry_exit),
            on_update: dry_update,
        },
        // Index 3: Done
        StateDescriptor {
            id: StateId::Done,
            name: "Done",
            on_enter: Some(done_enter),
            on_exit: None,
            on_update: done_update,
        },
    ]
}

// ═══════════════════════════════════════════════════════════════════════════
//  START
// ═══════════════════════════════════════════════════════════════════════════

fn start_update(_ctx: &mut FsmContext) -> Option<StateId> {
    Some(StateId::Wet)
}

// ═══════════════════════════════════════════════════════════════════════════
//  WET: soil is moist, pump held off
// ═══════════════════════════════════════════════════════════════════════════

fn wet_enter(ctx: &mut FsmContext) {
    ctx.pump_command = PumpCommand::Off;
}

fn wet_update(ctx: &mut FsmContext) -> Option<StateId> {
    if ctx.reading.is_dry() {
        return Some(StateId::Dry);
    }
    ctx.pump_command = PumpCommand::Off;
    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  DRY: watering
// ═══════════════════════════════════════════════════════════════════════════

fn dry_enter(ctx: &mut FsmContext) {
    ctx.pump_started_ms = Some(ctx.now_ms);
    info!("DRY: soil dry at {} ms, watering", ctx.now_ms);
}

fn dry_update(ctx: &mut FsmContext) -> Option<StateId> {
    if !ctx.reading.is_dry() {
        return Some(StateId::Wet);
    }
    // Re-asserted every tick so a glitched relay recovers.
    ctx.pump_command = PumpCommand::On;
    None
}

fn dry_exit(ctx: &mut FsmContext) {
    ctx.pump_command = PumpCommand::Off;
    ctx.close_session();
    if let Some(session) = ctx.completed_session {
        info!(
            "DRY: watered for {} ms, ~{} mL",
            session.duration_ms(),
            session.millilitres
        );
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  DONE: terminal, pump off
// ═══════════════════════════════════════════════════════════════════════════

fn done_enter(ctx: &mut FsmContext) {
    ctx.pump_command = PumpCommand::Off;
    info!("DONE: control loop stopping");
}

fn done_update(_ctx: &mut FsmContext) -> Option<StateId> {
    None
}
