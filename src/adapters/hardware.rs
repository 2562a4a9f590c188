//! Hardware adapter that bridges the GPIO drivers to domain port traits.
//!
//! Owns the [`Gpio`] register window, the moisture sensor and the pump
//! relay, exposing them through [`SensorPort`] and [`ActuatorPort`].
//! Generic over the [`RegisterBank`] so the same adapter drives
//! `/dev/gpiomem` on the board and [`SimRegisters`](crate::drivers::registers::SimRegisters)
//! on the host.

use log::info;

use crate::app::ports::{ActuatorPort, SensorPort};
use crate::config::LoopSettings;
use crate::drivers::gpio::Gpio;
use crate::drivers::pump::PumpDriver;
use crate::drivers::registers::RegisterBank;
use crate::error::GpioError;
use crate::sensors::moisture::{MoistureReading, MoistureSensor};

/// Concrete adapter that combines all hardware behind port traits.
pub struct HardwareAdapter<R: RegisterBank> {
    gpio: Gpio<R>,
    sensor: MoistureSensor,
    pump: PumpDriver,
}

impl<R: RegisterBank> HardwareAdapter<R> {
    /// Take ownership of a mapped register window and wire up the pins.
    ///
    /// Does not configure anything yet; call [`init_outputs`](Self::init_outputs).
    pub fn new(regs: R, settings: &LoopSettings) -> Self {
        Self {
            gpio: Gpio::new(regs),
            sensor: MoistureSensor::new(settings.sensor_pin),
            pump: PumpDriver::new(settings.pump_pin),
        }
    }

    /// Configure the pump relay as an output.  Returns the pin number.
    pub fn init_outputs(&mut self) -> Result<u8, GpioError> {
        self.pump.init(&mut self.gpio)?;
        info!("HW: pin {} set to output", self.pump.pin());
        Ok(self.pump.pin())
    }

    pub fn pump(&self) -> &PumpDriver {
        &self.pump
    }

    pub fn gpio(&self) -> &Gpio<R> {
        &self.gpio
    }

    pub fn gpio_mut(&mut self) -> &mut Gpio<R> {
        &mut self.gpio
    }

    /// Unmap the register window.  Every later port call fails with
    /// [`GpioError::NotInitialised`].
    pub fn release(&mut self) -> Option<R> {
        let regs = self.gpio.release();
        if regs.is_some() {
            info!("HW: GPIO released");
        }
        regs
    }
}

// ── SensorPort implementation ─────────────────────────────────

impl<R: RegisterBank> SensorPort for HardwareAdapter<R> {
    fn read_moisture(&mut self) -> Result<MoistureReading, GpioError> {
        self.sensor.read(&self.gpio)
    }
}

// ── ActuatorPort implementation ───────────────────────────────

impl<R: RegisterBank> ActuatorPort for HardwareAdapter<R> {
    fn set_pump(&mut self, on: bool) -> Result<(), GpioError> {
        if on {
            self.pump.start(&mut self.gpio)
        } else {
            self.pump.stop(&mut self.gpio)
        }
    }
}
