//! Sensor drivers.
//!
//! One probe today; each driver samples through [`Gpio`](crate::drivers::gpio::Gpio)
//! and returns a typed reading that the hardware adapter forwards to the
//! application core.

pub mod moisture;
