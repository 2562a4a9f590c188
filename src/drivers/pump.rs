//! Pump relay driver.
//!
//! A single digital output: HIGH energises the relay.  The driver is a dumb
//! actuator that remembers the last level it successfully wrote; deciding
//! *when* to pump belongs to the state machine.

use super::gpio::Gpio;
use super::registers::RegisterBank;
use crate::error::GpioError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PumpState {
    Stopped,
    Running,
}

pub struct PumpDriver {
    pin: u8,
    state: PumpState,
}

impl PumpDriver {
    pub fn new(pin: u8) -> Self {
        Self {
            pin,
            state: PumpState::Stopped,
        }
    }

    /// Configure the relay pin as an output without changing its level.
    pub fn init<R: RegisterBank>(&self, gpio: &mut Gpio<R>) -> Result<(), GpioError> {
        gpio.configure_as_output(self.pin)
    }

    pub fn start<R: RegisterBank>(&mut self, gpio: &mut Gpio<R>) -> Result<(), GpioError> {
        gpio.set_output(self.pin, true)?;
        self.state = PumpState::Running;
        Ok(())
    }

    pub fn stop<R: RegisterBank>(&mut self, gpio: &mut Gpio<R>) -> Result<(), GpioError> {
        gpio.set_output(self.pin, false)?;
        self.state = PumpState::Stopped;
        Ok(())
    }

    pub fn pin(&self) -> u8 {
        self.pin
    }

    pub fn state(&self) -> PumpState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == PumpState::Running
    }
}
