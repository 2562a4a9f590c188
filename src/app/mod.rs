//! Application core: domain logic with no I/O.
//!
//! The watering rules live here: FSM orchestration and pump-session
//! accounting.  All interaction with hardware happens through **port
//! traits** defined in [`ports`], keeping this layer testable without
//! a Raspberry Pi.

pub mod events;
pub mod ports;
pub mod service;
