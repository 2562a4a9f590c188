//! Soil-moisture sensor.
//!
//! The probe's comparator board drives a digital output: HIGH when the soil
//! is drier than the potentiometer threshold.  The pin is sampled fresh on
//! every tick; nothing is filtered or latched between ticks.

use crate::drivers::gpio::Gpio;
use crate::drivers::registers::RegisterBank;
use crate::error::GpioError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoistureReading {
    Dry,
    NotDry,
}

impl MoistureReading {
    pub fn is_dry(self) -> bool {
        self == Self::Dry
    }
}

impl From<bool> for MoistureReading {
    fn from(dry: bool) -> Self {
        if dry { Self::Dry } else { Self::NotDry }
    }
}

pub struct MoistureSensor {
    pin: u8,
}

impl MoistureSensor {
    pub fn new(pin: u8) -> Self {
        Self { pin }
    }

    pub fn read<R: RegisterBank>(&self, gpio: &Gpio<R>) -> Result<MoistureReading, GpioError> {
        gpio.read_input(self.pin).map(MoistureReading::from)
    }

    pub fn pin(&self) -> u8 {
        self.pin
    }
}
