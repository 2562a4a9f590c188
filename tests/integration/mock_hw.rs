//! Mock adapters for integration tests.
//!
//! Record every port call so tests can assert on the full command
//! history without touching `/dev/gpiomem` or `/dev/watchdog`.

use core::time::Duration;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use plant_guardian::app::events::AppEvent;
use plant_guardian::app::ports::{ActuatorPort, EventSink, SensorPort, TimePort, WatchdogPort};
use plant_guardian::error::{GpioError, WatchdogError};
use plant_guardian::events::ShutdownSignal;
use plant_guardian::sensors::moisture::MoistureReading;

// ── MockHardware ──────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum HwCall {
    Read,
    SetPump(bool),
}

/// Replays a script of readings; once exhausted, the last one repeats.
pub struct MockHardware {
    pub calls: Vec<HwCall>,
    script: VecDeque<Result<MoistureReading, GpioError>>,
    last: Result<MoistureReading, GpioError>,
    pub fail_pump: bool,
}

#[allow(dead_code)]
impl MockHardware {
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            script: VecDeque::new(),
            last: Ok(MoistureReading::NotDry),
            fail_pump: false,
        }
    }

    pub fn with_dry_script(dry: &[bool]) -> Self {
        let mut hw = Self::new();
        hw.script = dry.iter().map(|&d| Ok(MoistureReading::from(d))).collect();
        hw
    }

    pub fn push(&mut self, reading: Result<MoistureReading, GpioError>) {
        self.script.push_back(reading);
    }

    /// Last commanded pump level, `None` if never written.
    pub fn pump_on(&self) -> Option<bool> {
        self.calls.iter().rev().find_map(|c| match c {
            HwCall::SetPump(on) => Some(*on),
            HwCall::Read => None,
        })
    }

    pub fn pump_writes(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, HwCall::SetPump(_)))
            .count()
    }
}

impl Default for MockHardware {
    fn default() -> Self {
        Self::new()
    }
}

impl SensorPort for MockHardware {
    fn read_moisture(&mut self) -> Result<MoistureReading, GpioError> {
        self.calls.push(HwCall::Read);
        if let Some(next) = self.script.pop_front() {
            self.last = next;
        }
        self.last
    }
}

impl ActuatorPort for MockHardware {
    fn set_pump(&mut self, on: bool) -> Result<(), GpioError> {
        self.calls.push(HwCall::SetPump(on));
        if self.fail_pump {
            return Err(GpioError::NotInitialised);
        }
        Ok(())
    }
}

// ── Shared journal ────────────────────────────────────────────

/// One entry per observable side effect, across all mocks.
#[derive(Debug, Clone, PartialEq)]
pub enum Entry {
    Event(AppEvent),
    SetTimeout(u32),
    KeepAlive,
    MagicClose,
}

pub type Journal = Rc<RefCell<Vec<Entry>>>;

pub fn journal() -> Journal {
    Rc::new(RefCell::new(Vec::new()))
}

#[allow(dead_code)]
pub fn events(journal: &Journal) -> Vec<AppEvent> {
    journal
        .borrow()
        .iter()
        .filter_map(|e| match e {
            Entry::Event(ev) => Some(ev.clone()),
            _ => None,
        })
        .collect()
}

// ── RecordingSink ─────────────────────────────────────────────

pub struct RecordingSink {
    journal: Journal,
}

impl RecordingSink {
    pub fn new(journal: &Journal) -> Self {
        Self {
            journal: Rc::clone(journal),
        }
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.journal.borrow_mut().push(Entry::Event(event.clone()));
    }
}

// ── MockWatchdog ──────────────────────────────────────────────

pub struct MockWatchdog {
    journal: Journal,
    pub fail_keep_alive: bool,
    pub fail_close: bool,
}

#[allow(dead_code)]
impl MockWatchdog {
    pub fn new(journal: &Journal) -> Self {
        Self {
            journal: Rc::clone(journal),
            fail_keep_alive: false,
            fail_close: false,
        }
    }
}

impl WatchdogPort for MockWatchdog {
    fn set_timeout(&mut self, secs: u32) -> Result<u32, WatchdogError> {
        self.journal.borrow_mut().push(Entry::SetTimeout(secs));
        Ok(secs)
    }

    fn keep_alive(&mut self) -> Result<(), WatchdogError> {
        self.journal.borrow_mut().push(Entry::KeepAlive);
        if self.fail_keep_alive {
            return Err(WatchdogError::KeepAlive(5));
        }
        Ok(())
    }

    fn magic_close(self) -> Result<(), WatchdogError> {
        self.journal.borrow_mut().push(Entry::MagicClose);
        if self.fail_close {
            return Err(WatchdogError::MagicClose(5));
        }
        Ok(())
    }
}

// ── StepClock ─────────────────────────────────────────────────

/// Advances only when slept on.  Optionally raises the shutdown signal
/// after a fixed number of sleeps.
pub struct StepClock {
    pub now_ms: u64,
    pub sleeps: u32,
    stop_after: Option<(u32, ShutdownSignal)>,
}

#[allow(dead_code)]
impl StepClock {
    pub fn new() -> Self {
        Self {
            now_ms: 0,
            sleeps: 0,
            stop_after: None,
        }
    }

    pub fn stopping_after(sleeps: u32, signal: &ShutdownSignal) -> Self {
        Self {
            stop_after: Some((sleeps, signal.clone())),
            ..Self::new()
        }
    }
}

impl TimePort for StepClock {
    fn uptime_ms(&self) -> u64 {
        self.now_ms
    }

    fn sleep(&mut self, period: Duration) {
        self.now_ms += period.as_millis() as u64;
        self.sleeps += 1;
        if let Some((limit, signal)) = &self.stop_after {
            if self.sleeps >= *limit {
                signal.request();
            }
        }
    }
}
