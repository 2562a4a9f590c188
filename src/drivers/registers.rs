//! Register access layer: word-level access to the GPIO register window.
//!
//! ```text
//!   word 0..=5    GPFSEL0..5   function select
//!   word 7..=8    GPSET0..1    output set
//!   word 10..=11  GPCLR0..1    output clear
//!   word 13..=14  GPLEV0..1    pin level
//! ```
//!
//! Every access goes through a word index that is checked against
//! [`REGISTER_COUNT`]; nothing outside the window can be touched.
//!
//! ## Dual-target design
//!
//! With the `hw` feature: [`MmapRegisters`] maps `/dev/gpiomem`.
//! On host/test: [`SimRegisters`] keeps the window in memory and mirrors
//! set/clear writes into the level register the way the SoC does.

use crate::error::GpioError;
use crate::pins::{self, REGISTER_COUNT};

/// A fixed-length bank of 32-bit registers addressed by word index.
pub trait RegisterBank {
    /// Read the word at `index`.
    fn read(&self, index: usize) -> Result<u32, GpioError>;

    /// Write `value` to the word at `index`.
    fn write(&mut self, index: usize, value: u32) -> Result<(), GpioError>;
}

fn check_index(index: usize) -> Result<usize, GpioError> {
    if index < REGISTER_COUNT {
        Ok(index)
    } else {
        Err(GpioError::RegisterOutOfRange(index))
    }
}

// ───────────────────────────────────────────────────────────────
// Simulated window
// ───────────────────────────────────────────────────────────────

/// In-memory register window for host builds and tests.
#[derive(Debug, Clone)]
pub struct SimRegisters {
    words: [u32; REGISTER_COUNT],
    writes: usize,
}

impl Default for SimRegisters {
    fn default() -> Self {
        Self::new()
    }
}

impl SimRegisters {
    pub fn new() -> Self {
        Self {
            words: [0; REGISTER_COUNT],
            writes: 0,
        }
    }

    /// Drive an input pin's level from the outside world.
    pub fn set_level(&mut self, pin: u8, high: bool) {
        let idx = pins::gplev(usize::from(pin / 32));
        let bit = 1u32 << (pin % 32);
        if high {
            self.words[idx] |= bit;
        } else {
            self.words[idx] &= !bit;
        }
    }

    /// Raw view of a word, bypassing the write counter.
    pub fn peek(&self, index: usize) -> Result<u32, GpioError> {
        Ok(self.words[check_index(index)?])
    }

    /// Number of successful writes since construction.
    pub fn write_count(&self) -> usize {
        self.writes
    }
}

impl RegisterBank for SimRegisters {
    fn read(&self, index: usize) -> Result<u32, GpioError> {
        Ok(self.words[check_index(index)?])
    }

    fn write(&mut self, index: usize, value: u32) -> Result<(), GpioError> {
        let index = check_index(index)?;
        self.writes += 1;

        // Set/clear registers are write-only strobes that move the level bits.
        for bank in 0..2 {
            if index == pins::gpset(bank) {
                self.words[pins::gplev(bank)] |= value;
                return Ok(());
            }
            if index == pins::gpclr(bank) {
                self.words[pins::gplev(bank)] &= !value;
                return Ok(());
            }
        }
        self.words[index] = value;
        Ok(())
    }
}

// ───────────────────────────────────────────────────────────────
// Memory-mapped window
// ───────────────────────────────────────────────────────────────

#[cfg(feature = "hw")]
pub use mmap::MmapRegisters;

#[cfg(feature = "hw")]
mod mmap {
    use std::fs::OpenOptions;
    use std::os::unix::fs::OpenOptionsExt;

    use log::info;
    use memmap2::{MmapMut, MmapOptions};

    use super::{RegisterBank, check_index};
    use crate::error::{Error, GpioError};
    use crate::pins::GPIO_LEN;

    /// The BCM283x GPIO block mapped through `/dev/gpiomem`.
    ///
    /// Dropping the value unmaps the window.
    pub struct MmapRegisters {
        map: MmapMut,
    }

    impl MmapRegisters {
        /// Map the register window.  The file descriptor is closed once the
        /// mapping exists; the mapping keeps the registers reachable.
        pub fn open(path: &str) -> Result<Self, Error> {
            let file = OpenOptions::new()
                .read(true)
                .write(true)
                .custom_flags(libc::O_SYNC)
                .open(path)
                .map_err(|_| Error::Init("could not open GPIO memory device"))?;

            // SAFETY: the GPIO window is device memory owned by this process
            // for the lifetime of the mapping; every access below is a
            // volatile, aligned, in-bounds word access.
            let map = unsafe { MmapOptions::new().len(GPIO_LEN).map_mut(&file) }
                .map_err(|_| Error::Init("could not map GPIO registers"))?;

            info!("GPIO window mapped: {} ({} bytes)", path, GPIO_LEN);
            Ok(Self { map })
        }
    }

    impl RegisterBank for MmapRegisters {
        fn read(&self, index: usize) -> Result<u32, GpioError> {
            let index = check_index(index)?;
            // SAFETY: index < REGISTER_COUNT so the word lies inside the
            // mapping; the mapping is page aligned.
            Ok(unsafe { self.map.as_ptr().cast::<u32>().add(index).read_volatile() })
        }

        fn write(&mut self, index: usize, value: u32) -> Result<(), GpioError> {
            let index = check_index(index)?;
            // SAFETY: as in `read`.
            unsafe {
                self.map
                    .as_mut_ptr()
                    .cast::<u32>()
                    .add(index)
                    .write_volatile(value);
            }
            Ok(())
        }
    }
}
