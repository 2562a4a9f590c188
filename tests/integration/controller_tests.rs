//! Integration tests for the Controller: startup order, per-tick watchdog
//! kicks, and teardown on every exit path.

use crate::mock_hw::{Entry, Journal, MockWatchdog, RecordingSink, StepClock, events, journal};

use plant_guardian::app::events::AppEvent;
use plant_guardian::app::ports::ActuatorPort;
use plant_guardian::config::{ConfigPath, Configuration, LoopSettings};
use plant_guardian::controller::Controller;
use plant_guardian::drivers::registers::SimRegisters;
use plant_guardian::error::{Error, GpioError, WatchdogError};
use plant_guardian::events::ShutdownSignal;
use plant_guardian::fsm::StateId;
use plant_guardian::pins::{PUMP_PIN, SENSOR_PIN};

type TestController = Controller<SimRegisters, MockWatchdog, RecordingSink, StepClock>;

fn config(timeout_secs: u32) -> Configuration {
    Configuration {
        watchdog_timeout_secs: timeout_secs,
        log_file_path: ConfigPath::try_from("/tmp/plant.log").unwrap(),
        stat_file_path: ConfigPath::try_from("/tmp/plant.stat").unwrap(),
    }
}

fn start_with(j: &Journal, watchdog: MockWatchdog, clock: StepClock) -> TestController {
    match Controller::start(
        &config(15),
        LoopSettings::default(),
        SimRegisters::new(),
        watchdog,
        RecordingSink::new(j),
        clock,
    ) {
        Ok(c) => c,
        Err(e) => panic!("startup failed: {e}"),
    }
}

fn start(j: &Journal) -> TestController {
    start_with(j, MockWatchdog::new(j), StepClock::new())
}

fn set_dry(c: &mut TestController, dry: bool) {
    c.hardware_mut()
        .gpio_mut()
        .registers_mut()
        .unwrap()
        .set_level(SENSOR_PIN, dry);
}

fn position(j: &Journal, entry: &Entry) -> usize {
    j.borrow()
        .iter()
        .position(|e| e == entry)
        .unwrap_or_else(|| panic!("{entry:?} not in journal"))
}

#[test]
fn startup_runs_in_order() {
    let j = journal();
    let c = start(&j);
    assert_eq!(c.state(), StateId::Start);
    assert_eq!(
        j.borrow()[..6],
        [
            Entry::Event(AppEvent::GpioInitialised),
            Entry::Event(AppEvent::PinConfigured(PUMP_PIN)),
            Entry::Event(AppEvent::WatchdogOpened),
            Entry::SetTimeout(15),
            Entry::Event(AppEvent::WatchdogTimeoutSet(15)),
            Entry::Event(AppEvent::Started(StateId::Start)),
        ]
    );
}

#[test]
fn tick_too_slow_for_timeout_is_rejected_and_device_disarmed() {
    let j = journal();
    let settings = LoopSettings {
        tick_interval_ms: 600,
        ..LoopSettings::default()
    };
    let result = Controller::start(
        &config(1),
        settings,
        SimRegisters::new(),
        MockWatchdog::new(&j),
        RecordingSink::new(&j),
        StepClock::new(),
    );
    match result {
        Err(e) => assert_eq!(
            e,
            Error::Watchdog(WatchdogError::TimeoutTooShort {
                timeout_secs: 1,
                tick_ms: 600
            })
        ),
        Ok(_) => panic!("600 ms tick must not fit a 1 s timeout"),
    }
    // Never armed, but the opened device is still disarmed.
    assert_eq!(*j.borrow(), vec![Entry::MagicClose]);
}

#[test]
fn every_step_kicks_once_and_logs_it() {
    let j = journal();
    let mut c = start(&j);
    for _ in 0..5 {
        c.step();
    }
    let kicks = j.borrow().iter().filter(|e| **e == Entry::KeepAlive).count();
    let logged = events(&j)
        .iter()
        .filter(|e| **e == AppEvent::WatchdogKicked)
        .count();
    assert_eq!(kicks, 5);
    assert_eq!(logged, 5);
    assert_eq!(c.watchdog().map(|w| w.kick_count()), Some(5));
}

#[test]
fn run_stops_on_signal_and_tears_down_in_order() {
    let j = journal();
    let signal = ShutdownSignal::new();
    let mut c = start_with(&j, MockWatchdog::new(&j), StepClock::stopping_after(3, &signal));

    let summary = c.run(&signal).unwrap();
    assert_eq!(summary.ticks, 3);
    assert_eq!(c.state(), StateId::Done);
    assert!(c.watchdog().is_none());

    let done = position(
        &j,
        &Entry::Event(AppEvent::StateChanged {
            from: StateId::Wet,
            to: StateId::Done,
        }),
    );
    let close = position(&j, &Entry::MagicClose);
    let disabled = position(&j, &Entry::Event(AppEvent::WatchdogDisabled));
    let closed = position(&j, &Entry::Event(AppEvent::WatchdogClosed));
    let freed = position(&j, &Entry::Event(AppEvent::GpioFreed));
    assert!(done < close && close < disabled && disabled < closed && closed < freed);

    let last_kick = j
        .borrow()
        .iter()
        .rposition(|e| *e == Entry::KeepAlive)
        .unwrap();
    assert!(last_kick < close);
}

#[test]
fn signal_before_run_skips_the_loop() {
    let j = journal();
    let signal = ShutdownSignal::new();
    signal.request();
    let mut c = start(&j);
    let summary = c.run(&signal).unwrap();
    assert_eq!(summary.ticks, 0);
    assert!(!j.borrow().contains(&Entry::KeepAlive));
    assert!(j.borrow().contains(&Entry::MagicClose));
}

#[test]
fn shutdown_during_dry_session_records_it_and_stops_pump() {
    let j = journal();
    let mut c = start(&j);
    set_dry(&mut c, true);

    c.step(); // Start -> Wet
    c.clock_mut().now_ms = 1_000;
    c.step(); // Wet -> Dry
    c.clock_mut().now_ms = 1_100;
    c.step(); // pump on
    assert_eq!(c.state(), StateId::Dry);
    assert!(c.hardware().pump().is_running());

    c.clock_mut().now_ms = 3_000;
    c.shutdown().unwrap();
    assert!(!c.hardware().pump().is_running());

    let records: Vec<u64> = events(&j)
        .iter()
        .filter_map(|e| match e {
            AppEvent::PumpSession(s) => Some(s.millilitres),
            _ => None,
        })
        .collect();
    assert_eq!(records, vec![30]);
    assert_eq!(c.summary().millilitres, 30);
}

#[test]
fn shutdown_twice_is_a_no_op() {
    let j = journal();
    let mut c = start(&j);
    c.step();
    c.shutdown().unwrap();
    let len = j.borrow().len();
    c.shutdown().unwrap();
    drop(c);
    assert_eq!(j.borrow().len(), len);
}

#[test]
fn dropping_a_running_controller_tears_down() {
    let j = journal();
    {
        let mut c = start(&j);
        c.step();
    }
    let closes = j.borrow().iter().filter(|e| **e == Entry::MagicClose).count();
    assert_eq!(closes, 1);
    assert!(events(&j).contains(&AppEvent::GpioFreed));
}

#[test]
fn failed_close_is_reported_but_gpio_still_freed() {
    let j = journal();
    let mut wd = MockWatchdog::new(&j);
    wd.fail_close = true;
    let mut c = start_with(&j, wd, StepClock::new());
    c.step();

    assert_eq!(
        c.shutdown(),
        Err(Error::Watchdog(WatchdogError::MagicClose(5)))
    );
    let ev = events(&j);
    assert!(ev.contains(&AppEvent::GpioFreed));
    assert!(!ev.contains(&AppEvent::WatchdogDisabled));
    drop(c);
    let closes = j.borrow().iter().filter(|e| **e == Entry::MagicClose).count();
    assert_eq!(closes, 1);
}

#[test]
fn failed_kick_is_reported_and_loop_continues() {
    let j = journal();
    let mut wd = MockWatchdog::new(&j);
    wd.fail_keep_alive = true;
    let mut c = start_with(&j, wd, StepClock::new());
    c.step();
    c.step();
    let faults = events(&j)
        .iter()
        .filter(|e| **e == AppEvent::HardwareFault(Error::Watchdog(WatchdogError::KeepAlive(5))))
        .count();
    assert_eq!(faults, 2);
    assert_eq!(c.state(), StateId::Wet);
}

#[test]
fn gpio_is_unusable_after_teardown() {
    let j = journal();
    let mut c = start(&j);
    c.shutdown().unwrap();
    assert_eq!(
        c.hardware_mut().set_pump(true),
        Err(GpioError::NotInitialised)
    );
    assert!(!c.hardware().gpio().is_initialised());
}
