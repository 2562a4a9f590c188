//! GPIO pin assignments and BCM283x register layout.
//!
//! Every driver references this module rather than
//! hard-coding pin numbers or register offsets.
//!
//! Offsets are in 32-bit **words** from the start of the `/dev/gpiomem`
//! window, not bytes.

// ---------------------------------------------------------------------------
// Board wiring
// ---------------------------------------------------------------------------

/// Digital input: soil-moisture comparator.  HIGH = soil is dry.
pub const SENSOR_PIN: u8 = 4;
/// Digital output: pump relay.  HIGH = pump running.
pub const PUMP_PIN: u8 = 17;

/// Lowest pin usable as a general-purpose I/O (0 and 1 are the ID EEPROM bus).
pub const GPIO_PIN_MIN: u8 = 2;
/// Highest pin brought out on the 40-pin header.
pub const GPIO_PIN_MAX: u8 = 27;

// ---------------------------------------------------------------------------
// Register window
// ---------------------------------------------------------------------------

/// Length of the mapped GPIO window in bytes.
pub const GPIO_LEN: usize = 0xB4;
/// Number of 32-bit registers in the window.
pub const REGISTER_COUNT: usize = GPIO_LEN / 4;

/// Function-select register `n` (10 pins per register, 3 bits per pin).
pub const fn gpfsel(n: usize) -> usize {
    n
}

/// Output-set register `n` (write 1 to drive HIGH).
pub const fn gpset(n: usize) -> usize {
    7 + n
}

/// Output-clear register `n` (write 1 to drive LOW).
pub const fn gpclr(n: usize) -> usize {
    10 + n
}

/// Pin-level register `n` (read-only).
pub const fn gplev(n: usize) -> usize {
    13 + n
}

/// Pins covered by one function-select register.
pub const PINS_PER_FSEL: u8 = 10;
/// Width of one pin's function-select field.
pub const FSEL_BITS: u8 = 3;
/// Function-select encoding for "output".
pub const FSEL_OUTPUT: u32 = 0b001;
/// Mask for a single function-select field.
pub const FSEL_MASK: u32 = 0b111;

// ---------------------------------------------------------------------------
// Device nodes
// ---------------------------------------------------------------------------

/// Unprivileged GPIO register window.
pub const GPIO_MEM_PATH: &str = "/dev/gpiomem";
/// Kernel hardware watchdog.
pub const WATCHDOG_PATH: &str = "/dev/watchdog";
