//! Controller configuration.
//!
//! Three values come from the config file at startup (watchdog timeout,
//! log path, stat path); the rest are properties of the board and pump and
//! are compiled in.  Nothing is reloaded while the loop runs.

pub mod parser;

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Error};
use crate::pins;

pub use parser::{ConfigKey, ConfigWarning, ParseReport, WarningKind};

/// Default location of the config file on the target.
pub const DEFAULT_CONFIG_PATH: &str = "/home/pi/plant.cfg";

/// Capacity of a configured file path, in bytes.
pub const MAX_PATH_LEN: usize = 128;

/// Bounded path buffer.  Over-long values are rejected by the parser,
/// never truncated.
pub type ConfigPath = heapless::String<MAX_PATH_LEN>;

/// Values read from the config file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Configuration {
    /// Hardware watchdog timeout in seconds.  Zero means "not configured".
    pub watchdog_timeout_secs: u32,
    /// Append-only event log.
    pub log_file_path: ConfigPath,
    /// Append-only pump statistics.
    pub stat_file_path: ConfigPath,
}

impl Configuration {
    /// All three fields must be populated before the watchdog is armed.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.watchdog_timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        if self.log_file_path.is_empty() {
            return Err(ConfigError::MissingLogPath);
        }
        if self.stat_file_path.is_empty() {
            return Err(ConfigError::MissingStatPath);
        }
        Ok(())
    }
}

/// Compiled-in loop and hardware parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoopSettings {
    /// Delay between control ticks (milliseconds).
    pub tick_interval_ms: u32,
    /// Pump delivery rate from the manufacturer's sheet (mL per second).
    pub pump_flow_ml_per_sec: u32,
    /// Moisture comparator input.
    pub sensor_pin: u8,
    /// Pump relay output.
    pub pump_pin: u8,
}

impl Default for LoopSettings {
    fn default() -> Self {
        Self {
            tick_interval_ms: 100, // 10 Hz
            pump_flow_ml_per_sec: 15,
            sensor_pin: pins::SENSOR_PIN,
            pump_pin: pins::PUMP_PIN,
        }
    }
}

/// Read and parse a config file.
///
/// Fields absent from the file keep their [`Configuration::default`] value;
/// call [`Configuration::validate`] on the result before using it.
pub fn load(path: impl AsRef<Path>) -> Result<ParseReport, Error> {
    let file = File::open(path.as_ref()).map_err(|_| ConfigError::Unreadable)?;
    parser::parse(BufReader::new(file), Configuration::default())
        .map_err(|_| ConfigError::Unreadable.into())
}
