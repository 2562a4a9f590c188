//! Plant Guardian library.
//!
//! Exposes every module for integration testing on the host.  Code that
//! needs the real board (`/dev/gpiomem`, `/dev/watchdog`) is guarded by
//! the `hw` feature within each module; the `Sim*` stand-ins are always
//! available.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod controller;
pub mod drivers;
pub mod error;
pub mod events;
pub mod fsm;
pub mod pins;
pub mod safety;
pub mod sensors;
