//! GPIO control on top of the register access layer.
//!
//! Translates pin numbers into function-select fields and set/clear/level
//! bits.  Owns the register window: once [`Gpio::release`] has run, every
//! operation reports [`GpioError::NotInitialised`] and touches nothing.
//!
//! Invalid pins are rejected with a warning before any register is read or
//! written.  Nothing here retries or blocks.

use embedded_hal::digital::{ErrorType, InputPin, OutputPin};

use super::registers::RegisterBank;
use crate::error::GpioError;
use crate::pins::{
    self, FSEL_BITS, FSEL_MASK, FSEL_OUTPUT, GPIO_PIN_MAX, GPIO_PIN_MIN, PINS_PER_FSEL,
};

/// Reject pins outside the usable header range.
pub fn validate_pin(pin: u8) -> Result<u8, GpioError> {
    if (GPIO_PIN_MIN..=GPIO_PIN_MAX).contains(&pin) {
        Ok(pin)
    } else {
        log::warn!("GPIO: pin {} outside {}..={}, ignored", pin, GPIO_PIN_MIN, GPIO_PIN_MAX);
        Err(GpioError::InvalidPin(pin))
    }
}

/// GPIO controller.  Generic over the register backend so the same logic
/// runs against `/dev/gpiomem` and the in-memory simulation.
pub struct Gpio<R: RegisterBank> {
    regs: Option<R>,
}

impl<R: RegisterBank> Gpio<R> {
    pub fn new(regs: R) -> Self {
        Self { regs: Some(regs) }
    }

    /// A controller with no register window behind it.
    pub fn uninitialised() -> Self {
        Self { regs: None }
    }

    pub fn is_initialised(&self) -> bool {
        self.regs.is_some()
    }

    /// Set the function-select field of `pin` to "output".
    pub fn configure_as_output(&mut self, pin: u8) -> Result<(), GpioError> {
        let regs = self.regs.as_mut().ok_or(GpioError::NotInitialised)?;
        let pin = validate_pin(pin)?;

        let idx = pins::gpfsel(usize::from(pin / PINS_PER_FSEL));
        let shift = u32::from((pin % PINS_PER_FSEL) * FSEL_BITS);

        let mut sel = regs.read(idx)?;
        sel &= !(FSEL_MASK << shift);
        sel |= FSEL_OUTPUT << shift;
        regs.write(idx, sel)
    }

    /// Live level of `pin` (`true` = HIGH).
    pub fn read_input(&self, pin: u8) -> Result<bool, GpioError> {
        let regs = self.regs.as_ref().ok_or(GpioError::NotInitialised)?;
        let pin = validate_pin(pin)?;

        let level = regs.read(pins::gplev(usize::from(pin / 32)))?;
        Ok(level & (1 << (pin % 32)) != 0)
    }

    /// Drive `pin` HIGH or LOW.
    ///
    /// The pin is re-configured as an output before every write so a pin
    /// whose function was changed behind our back is reasserted.
    pub fn set_output(&mut self, pin: u8, high: bool) -> Result<(), GpioError> {
        self.configure_as_output(pin)?;
        let regs = self.regs.as_mut().ok_or(GpioError::NotInitialised)?;

        let bank = usize::from(pin / 32);
        let idx = if high { pins::gpset(bank) } else { pins::gpclr(bank) };
        regs.write(idx, 1 << (pin % 32))
    }

    /// Borrow a single pin through the `embedded-hal` digital traits.
    pub fn pin(&mut self, pin: u8) -> GpioPin<'_, R> {
        GpioPin { gpio: self, pin }
    }

    /// Read-only access to the backend (simulation inspection).
    pub fn registers(&self) -> Option<&R> {
        self.regs.as_ref()
    }

    /// Mutable access to the backend (simulation stimulus).
    pub fn registers_mut(&mut self) -> Option<&mut R> {
        self.regs.as_mut()
    }

    /// Give up the register window.  Returns the backend so the caller
    /// controls when it is dropped (dropping an mmap backend unmaps it).
    pub fn release(&mut self) -> Option<R> {
        self.regs.take()
    }
}

// ───────────────────────────────────────────────────────────────
// embedded-hal pin view
// ───────────────────────────────────────────────────────────────

/// One pin of a [`Gpio`], usable wherever an `embedded-hal` pin is expected.
pub struct GpioPin<'a, R: RegisterBank> {
    gpio: &'a mut Gpio<R>,
    pin: u8,
}

impl<R: RegisterBank> ErrorType for GpioPin<'_, R> {
    type Error = GpioError;
}

impl<R: RegisterBank> OutputPin for GpioPin<'_, R> {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.gpio.set_output(self.pin, false)
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.gpio.set_output(self.pin, true)
    }
}

impl<R: RegisterBank> InputPin for GpioPin<'_, R> {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        self.gpio.read_input(self.pin)
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        self.gpio.read_input(self.pin).map(|high| !high)
    }
}
