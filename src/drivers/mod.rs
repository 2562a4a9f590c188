//! Register access, GPIO control, actuator and watchdog drivers.

pub mod gpio;
pub mod pump;
pub mod registers;
pub mod watchdog;
