//! File-backed event sink.
//!
//! Implements [`EventSink`] by appending one timestamped line per event to
//! the log file, and one line per pump session to the statistics file:
//!
//! ```text
//! 10-19-2026  14:03:07. : plant-guardian : State has been set to DRY
//! ```
//!
//! File trouble is never fatal.  A failed write drops the handle, and the
//! next event reopens the file.  Every line is mirrored to the `log`
//! facade as well.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// `chrono` format for the leading timestamp.
pub const TIMESTAMP_FORMAT: &str = "%m-%d-%Y  %T.";

/// Local wall-clock time in [`TIMESTAMP_FORMAT`].
pub fn timestamp() -> String {
    chrono::Local::now().format(TIMESTAMP_FORMAT).to_string()
}

/// Render one record.
pub fn format_line(timestamp: &str, program: &str, message: &str) -> String {
    format!("{timestamp} : {program} : {message}\n")
}

/// Basename of `argv[0]`, falling back to the crate name.
pub fn program_name(argv0: Option<&str>) -> String {
    argv0
        .and_then(|a| Path::new(a).file_name())
        .and_then(|n| n.to_str())
        .filter(|n| !n.is_empty())
        .unwrap_or(env!("CARGO_PKG_NAME"))
        .to_owned()
}

// ───────────────────────────────────────────────────────────────
// Append-only file with lazy reopen
// ───────────────────────────────────────────────────────────────

struct AppendFile {
    path: PathBuf,
    file: Option<File>,
}

impl AppendFile {
    /// Open for append, creating the file if needed.
    /// Returns whether the file had to be created.
    fn open(path: &Path) -> (Self, bool) {
        let existed = path.exists();
        let mut this = Self {
            path: path.to_path_buf(),
            file: None,
        };
        let created = this.reopen().is_ok() && !existed;
        (this, created)
    }

    fn reopen(&mut self) -> io::Result<()> {
        match OpenOptions::new().append(true).create(true).open(&self.path) {
            Ok(f) => {
                self.file = Some(f);
                Ok(())
            }
            Err(e) => {
                warn!("Sink: cannot open {}: {}", self.path.display(), e);
                Err(e)
            }
        }
    }

    fn write(&mut self, line: &str) -> io::Result<()> {
        if self.file.is_none() {
            self.reopen()?;
        }
        let Some(file) = self.file.as_mut() else {
            return Err(io::ErrorKind::NotFound.into());
        };
        let result = file.write_all(line.as_bytes()).and_then(|()| file.flush());
        if let Err(e) = &result {
            warn!("Sink: write to {} failed: {}", self.path.display(), e);
            self.file = None;
        }
        result
    }

    fn is_open(&self) -> bool {
        self.file.is_some()
    }
}

// ───────────────────────────────────────────────────────────────
// FileEventSink
// ───────────────────────────────────────────────────────────────

pub struct FileEventSink {
    program: String,
    log: AppendFile,
    stat: AppendFile,
    dropped: u64,
}

impl FileEventSink {
    /// Open (or create) both files.  Creation is itself logged.
    pub fn open(program: impl Into<String>, log_path: &Path, stat_path: &Path) -> Self {
        let (log, log_created) = AppendFile::open(log_path);
        let (stat, stat_created) = AppendFile::open(stat_path);
        let mut sink = Self {
            program: program.into(),
            log,
            stat,
            dropped: 0,
        };
        if log_created {
            sink.log_message("Log file could not be found, created a new one");
        }
        if stat_created {
            sink.log_message("Stat file could not be found, created a new one");
        }
        info!(
            "Sink: logging to {}, stats to {}",
            log_path.display(),
            stat_path.display()
        );
        sink
    }

    /// Append a free-form message to the log file.
    pub fn log_message(&mut self, message: &str) {
        debug!("{}", message);
        let line = format_line(&timestamp(), &self.program, message);
        if self.log.write(&line).is_err() {
            self.dropped += 1;
        }
    }

    fn stat_message(&mut self, message: &str) {
        info!("{}", message);
        let line = format_line(&timestamp(), &self.program, message);
        if self.stat.write(&line).is_err() {
            self.dropped += 1;
        }
    }

    /// Records lost to I/O errors since startup.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    pub fn is_log_open(&self) -> bool {
        self.log.is_open()
    }

    pub fn is_stat_open(&self) -> bool {
        self.stat.is_open()
    }
}

/// Log-file text for an event; `None` for events that go elsewhere.
pub fn describe(event: &AppEvent) -> Option<String> {
    let text = match event {
        AppEvent::ConfigWarning(w) => format!("Config warning: {w}"),
        AppEvent::GpioInitialised => "The GPIO pins have been initialized".into(),
        AppEvent::PinConfigured(pin) => format!("Pin {pin} has been set to output"),
        AppEvent::WatchdogOpened => "The Watchdog file has been opened".into(),
        AppEvent::WatchdogTimeoutSet(secs) => {
            format!("The Watchdog time limit has been set to {secs} seconds")
        }
        AppEvent::Started(state) | AppEvent::StateChanged { to: state, .. } => {
            format!("State has been set to {}", state.label())
        }
        AppEvent::PumpSession(_) => return None,
        AppEvent::HardwareFault(e) => format!("Hardware fault: {e}"),
        AppEvent::WatchdogKicked => "The Watchdog was kicked".into(),
        AppEvent::ShutdownRequested => "Shutdown requested".into(),
        AppEvent::WatchdogDisabled => "The Watchdog was disabled".into(),
        AppEvent::WatchdogClosed => "The Watchdog was closed".into(),
        AppEvent::GpioFreed => "The GPIO pins have been freed".into(),
    };
    Some(text)
}

impl EventSink for FileEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::PumpSession(session) => {
                self.stat_message(&format!("{} mL of water was pumped", session.millilitres));
            }
            other => {
                if let Some(text) = describe(other) {
                    self.log_message(&text);
                }
            }
        }
    }
}
