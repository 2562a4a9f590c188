//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter     | Implements   | Connects to                    |
//! |-------------|--------------|--------------------------------|
//! | `hardware`  | SensorPort   | GPIO input (moisture sensor)   |
//! |             | ActuatorPort | GPIO output (pump relay)       |
//! | `log_sink`  | EventSink    | Log and statistics files       |
//! | `time`      | TimePort     | `std::time::Instant`           |
//!
//! The watchdog adapter lives with the drivers in
//! [`drivers::watchdog`](crate::drivers::watchdog).

pub mod hardware;
pub mod log_sink;
pub mod time;
