//! File-backed tests: config loading from disk and a full simulated run
//! that writes real log and statistics files.

use std::fs;
use std::io::Write;

use crate::mock_hw::StepClock;

use plant_guardian::adapters::log_sink::FileEventSink;
use plant_guardian::app::events::AppEvent;
use plant_guardian::app::ports::EventSink;
use plant_guardian::config::{self, LoopSettings, WarningKind};
use plant_guardian::controller::Controller;
use plant_guardian::drivers::registers::SimRegisters;
use plant_guardian::drivers::watchdog::SimWatchdog;
use plant_guardian::error::{ConfigError, Error};
use plant_guardian::pins::SENSOR_PIN;

fn write_config(dir: &tempfile::TempDir, body: &str) -> std::path::PathBuf {
    let path = dir.path().join("plant.cfg");
    let mut f = fs::File::create(&path).unwrap();
    f.write_all(body.as_bytes()).unwrap();
    path
}

#[test]
fn loads_a_typical_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(
        &dir,
        "# plant controller\r\nW = 15 # seconds\r\nL = /var/log/plant.log\r\nS = /var/log/plant.stat\r\n",
    );
    let report = config::load(&path).unwrap();
    assert!(report.warnings.is_empty());
    assert_eq!(report.config.watchdog_timeout_secs, 15);
    assert_eq!(report.config.log_file_path.as_str(), "/var/log/plant.log");
    assert_eq!(report.config.stat_file_path.as_str(), "/var/log/plant.stat");
    assert!(report.config.validate().is_ok());
}

#[test]
fn missing_file_is_a_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = config::load(dir.path().join("absent.cfg")).unwrap_err();
    assert_eq!(err, Error::Config(ConfigError::Unreadable));
}

#[test]
fn file_without_recognised_lines_fails_validation() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(&dir, "# nothing here\n\nhello\n");
    let report = config::load(&path).unwrap();
    assert!(report.warnings.is_empty());
    assert_eq!(report.config.validate(), Err(ConfigError::ZeroTimeout));
}

#[test]
fn degraded_lines_surface_as_warnings() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(&dir, "W = 10\nL no equals here\nS = /tmp/s\nW = abc\n");
    let report = config::load(&path).unwrap();
    assert_eq!(report.config.watchdog_timeout_secs, 10);
    assert!(report.config.log_file_path.is_empty());
    let kinds: Vec<(usize, WarningKind)> =
        report.warnings.iter().map(|w| (w.line, w.kind)).collect();
    assert_eq!(
        kinds,
        vec![(2, WarningKind::MissingSeparator), (4, WarningKind::NoDigits)]
    );
}

#[test]
fn simulated_run_writes_log_and_stat_files() {
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("plant.log");
    let stat = dir.path().join("plant.stat");
    let cfg_path = write_config(
        &dir,
        &format!("W = 5\nL = {}\nS = {}\nX = 1\nL oops\n", log.display(), stat.display()),
    );

    let report = config::load(&cfg_path).unwrap();
    report.config.validate().unwrap();

    let mut sink = FileEventSink::open("plant", &log, &stat);
    for w in &report.warnings {
        sink.emit(&AppEvent::ConfigWarning(*w));
    }

    let mut c = Controller::start(
        &report.config,
        LoopSettings::default(),
        SimRegisters::new(),
        SimWatchdog::new(),
        sink,
        StepClock::new(),
    )
    .unwrap();

    c.step();
    c.hardware_mut()
        .gpio_mut()
        .registers_mut()
        .unwrap()
        .set_level(SENSOR_PIN, true);
    c.clock_mut().now_ms = 1_000;
    c.step();
    c.clock_mut().now_ms = 3_000;
    c.step();
    c.hardware_mut()
        .gpio_mut()
        .registers_mut()
        .unwrap()
        .set_level(SENSOR_PIN, false);
    c.clock_mut().now_ms = 5_000;
    c.step();
    c.shutdown().unwrap();
    drop(c);

    let log_text = fs::read_to_string(&log).unwrap();
    let messages: Vec<&str> = log_text
        .lines()
        .map(|l| l.splitn(3, " : ").nth(2).unwrap())
        .collect();
    assert_eq!(messages[0], "Log file could not be found, created a new one");
    assert_eq!(messages[1], "Stat file could not be found, created a new one");
    assert!(messages[2].starts_with("Config warning: config line 5 ('L')"));
    assert_eq!(
        &messages[3..9],
        [
            "The GPIO pins have been initialized",
            "Pin 17 has been set to output",
            "The Watchdog file has been opened",
            "The Watchdog time limit has been set to 5 seconds",
            "State has been set to START",
            "State has been set to WET",
        ]
    );
    assert_eq!(
        messages.iter().filter(|m| **m == "The Watchdog was kicked").count(),
        4
    );
    assert!(messages.contains(&"State has been set to DRY"));
    assert_eq!(
        &messages[messages.len() - 6..],
        [
            "The Watchdog was kicked",
            "Shutdown requested",
            "State has been set to DONE",
            "The Watchdog was disabled",
            "The Watchdog was closed",
            "The GPIO pins have been freed",
        ]
    );

    let stat_text = fs::read_to_string(&stat).unwrap();
    let stat_lines: Vec<&str> = stat_text.lines().collect();
    assert_eq!(stat_lines.len(), 1);
    // Dry from 1 s to 5 s at 15 mL/s.
    assert!(stat_lines[0].ends_with(" : plant : 60 mL of water was pumped"));
}
