//! Plant Guardian entry point
//!
//! Hexagonal architecture around a polling control loop.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter<MmapRegisters>   FileEventSink   MonotonicClock│
//! │  (Sensor+Actuator)                (EventSink)     (TimePort)   │
//! │  LinuxWatchdog (WatchdogPort)                                  │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │       Controller ─▶ IrrigationService (pure logic)     │    │
//! │  │       FSM · pump sessions · watchdog supervisor        │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Usage: `plant-guardian [CONFIG_PATH]` (default `/home/pi/plant.cfg`).
//! Diagnostics go to stderr, filtered by `RUST_LOG` (default `info`).
#![deny(unused_must_use)]

use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use log::{error, info};
use tracing_subscriber::EnvFilter;

use plant_guardian::adapters::log_sink::{FileEventSink, program_name};
use plant_guardian::adapters::time::MonotonicClock;
use plant_guardian::app::events::AppEvent;
use plant_guardian::app::ports::EventSink;
use plant_guardian::config::{self, DEFAULT_CONFIG_PATH, LoopSettings};
use plant_guardian::controller::Controller;
use plant_guardian::drivers::registers::MmapRegisters;
use plant_guardian::drivers::watchdog::LinuxWatchdog;
use plant_guardian::events::ShutdownSignal;
use plant_guardian::pins::{GPIO_MEM_PATH, WATCHDOG_PATH};

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run() -> Result<()> {
    let mut args = std::env::args();
    let program = program_name(args.next().as_deref());
    let config_path = args.next().unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_owned());

    info!("Plant Guardian v{}", env!("CARGO_PKG_VERSION"));

    // ── 1. Config ─────────────────────────────────────────────
    let report = config::load(&config_path)
        .with_context(|| format!("the config file {config_path} could not be opened"))?;
    let cfg = report.config;
    cfg.validate()
        .with_context(|| format!("the config file {config_path} is incomplete"))?;
    let settings = LoopSettings::default();

    // ── 2. Log + stat files (never fatal) ─────────────────────
    let mut sink = FileEventSink::open(
        program,
        Path::new(cfg.log_file_path.as_str()),
        Path::new(cfg.stat_file_path.as_str()),
    );
    for w in report.warnings {
        sink.emit(&AppEvent::ConfigWarning(w));
    }

    // ── 3. Shutdown signal ────────────────────────────────────
    let shutdown = ShutdownSignal::new();
    let handler = shutdown.clone();
    ctrlc::set_handler(move || handler.request())
        .context("couldn't install the termination handler")?;

    // ── 4. Hardware ───────────────────────────────────────────
    let regs = MmapRegisters::open(GPIO_MEM_PATH)
        .with_context(|| format!("couldn't map {GPIO_MEM_PATH}"))?;
    let watchdog = LinuxWatchdog::open(WATCHDOG_PATH)
        .with_context(|| format!("couldn't open {WATCHDOG_PATH}"))?;

    let mut controller = Controller::start(
        &cfg,
        settings,
        regs,
        watchdog,
        sink,
        MonotonicClock::new(),
    )
    .context("startup failed")?;

    // ── 5. Control loop ───────────────────────────────────────
    let summary = controller.run(&shutdown).context("teardown failed")?;
    info!(
        "Stopped after {} ticks: {} watering sessions, ~{} mL",
        summary.ticks, summary.sessions, summary.millilitres
    );
    Ok(())
}

fn main() -> ExitCode {
    init_logging();
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("{}: {:#}", env!("CARGO_PKG_NAME"), e);
            ExitCode::FAILURE
        }
    }
}
