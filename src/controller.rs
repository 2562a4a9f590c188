//! The controller owns every collaborator of the irrigation loop.
//!
//! ```text
//!  startup:  GPIO window ─▶ pump pin output ─▶ watchdog armed ─▶ FSM Start
//!  loop:     read ─▶ FSM ─▶ pump ─▶ kick ─▶ sleep      (until shutdown)
//!  teardown: pump off ─▶ watchdog disabled + closed ─▶ GPIO released
//! ```
//!
//! Teardown runs exactly once: from [`Controller::shutdown`], or from
//! `Drop` if the controller goes away without it.

use core::time::Duration;

use log::{error, info, warn};

use crate::adapters::hardware::HardwareAdapter;
use crate::app::events::AppEvent;
use crate::app::ports::{EventSink, TimePort, WatchdogPort};
use crate::app::service::IrrigationService;
use crate::config::{Configuration, LoopSettings};
use crate::drivers::registers::RegisterBank;
use crate::error::{Error, Result};
use crate::events::ShutdownSignal;
use crate::fsm::StateId;
use crate::safety::{WatchdogSupervisor, check_tick_interval};

/// Totals reported when the loop ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub ticks: u64,
    pub sessions: u64,
    pub millilitres: u64,
}

pub struct Controller<R, W, S, T>
where
    R: RegisterBank,
    W: WatchdogPort,
    S: EventSink,
    T: TimePort,
{
    service: IrrigationService,
    hw: HardwareAdapter<R>,
    watchdog: Option<WatchdogSupervisor<W>>,
    sink: S,
    clock: T,
    tick: Duration,
    torn_down: bool,
}

impl<R, W, S, T> Controller<R, W, S, T>
where
    R: RegisterBank,
    W: WatchdogPort,
    S: EventSink,
    T: TimePort,
{
    /// Bring up the hardware in order and start the FSM.
    ///
    /// `regs` must already be mapped and `watchdog` already opened; both
    /// events are logged here so they land in the log file.  On error the
    /// resources acquired so far are released, and an opened watchdog is
    /// magic-closed so the board does not reset under a failed start.
    pub fn start(
        config: &Configuration,
        settings: LoopSettings,
        regs: R,
        watchdog: W,
        mut sink: S,
        clock: T,
    ) -> Result<Self> {
        let hw = match Self::bring_up_gpio(config, &settings, regs, &mut sink) {
            Ok(hw) => hw,
            Err(e) => {
                abandon(watchdog);
                return Err(e);
            }
        };

        sink.emit(&AppEvent::WatchdogOpened);
        let supervisor = WatchdogSupervisor::arm(watchdog, config.watchdog_timeout_secs)?;
        sink.emit(&AppEvent::WatchdogTimeoutSet(supervisor.timeout_secs()));

        let tick = Duration::from_millis(u64::from(settings.tick_interval_ms));
        let mut service = IrrigationService::new(settings);
        service.start(&mut sink);

        info!(
            "Controller: running, tick {:?}, watchdog {}s",
            tick,
            supervisor.timeout_secs()
        );

        Ok(Self {
            service,
            hw,
            watchdog: Some(supervisor),
            sink,
            clock,
            tick,
            torn_down: false,
        })
    }

    fn bring_up_gpio(
        config: &Configuration,
        settings: &LoopSettings,
        regs: R,
        sink: &mut S,
    ) -> Result<HardwareAdapter<R>> {
        check_tick_interval(config.watchdog_timeout_secs, settings.tick_interval_ms)?;

        sink.emit(&AppEvent::GpioInitialised);
        let mut hw = HardwareAdapter::new(regs, settings);
        let pin = hw.init_outputs()?;
        sink.emit(&AppEvent::PinConfigured(pin));
        Ok(hw)
    }

    /// One control tick followed by a watchdog kick.  Never fails; faults
    /// are reported as events.
    pub fn step(&mut self) {
        let now = self.clock.uptime_ms();
        self.service.tick(now, &mut self.hw, &mut self.sink);

        if let Some(wd) = self.watchdog.as_mut() {
            match wd.kick() {
                Ok(()) => self.sink.emit(&AppEvent::WatchdogKicked),
                Err(e) => {
                    warn!("Controller: watchdog kick failed: {}", e);
                    self.sink.emit(&AppEvent::HardwareFault(Error::Watchdog(e)));
                }
            }
        }
    }

    /// Tick until `shutdown` is requested, then tear down.
    pub fn run(&mut self, shutdown: &ShutdownSignal) -> Result<RunSummary> {
        while !shutdown.is_requested() && !self.service.state().is_terminal() {
            self.step();
            self.clock.sleep(self.tick);
        }
        info!("Controller: leaving loop");
        self.shutdown()?;
        Ok(self.summary())
    }

    /// Pump off, watchdog disabled and closed, GPIO released.
    ///
    /// Every step is attempted even if an earlier one fails; the first
    /// failure is returned.  A second call does nothing.
    pub fn shutdown(&mut self) -> Result<()> {
        if self.torn_down {
            return Ok(());
        }
        self.torn_down = true;
        let mut first_err = None;

        let now = self.clock.uptime_ms();
        self.service.shutdown(now, &mut self.hw, &mut self.sink);

        if let Some(wd) = self.watchdog.take() {
            match wd.disable_and_close() {
                Ok(()) => {
                    self.sink.emit(&AppEvent::WatchdogDisabled);
                    self.sink.emit(&AppEvent::WatchdogClosed);
                }
                Err(e) => {
                    error!("Controller: watchdog close failed: {}", e);
                    self.sink.emit(&AppEvent::HardwareFault(Error::Watchdog(e)));
                    first_err = Some(Error::Watchdog(e));
                }
            }
        }

        if self.hw.release().is_some() {
            self.sink.emit(&AppEvent::GpioFreed);
        }

        first_err.map_or(Ok(()), Err)
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn state(&self) -> StateId {
        self.service.state()
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            ticks: self.service.tick_count(),
            sessions: self.service.session_count(),
            millilitres: self.service.millilitres_total(),
        }
    }

    pub fn hardware(&self) -> &HardwareAdapter<R> {
        &self.hw
    }

    pub fn hardware_mut(&mut self) -> &mut HardwareAdapter<R> {
        &mut self.hw
    }

    pub fn watchdog(&self) -> Option<&WatchdogSupervisor<W>> {
        self.watchdog.as_ref()
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn clock_mut(&mut self) -> &mut T {
        &mut self.clock
    }
}

/// Disarm a watchdog that was opened but never handed to a supervisor.
fn abandon<W: WatchdogPort>(watchdog: W) {
    warn!("Controller: startup failed, disarming watchdog");
    if let Err(e) = watchdog.magic_close() {
        error!("Controller: magic close failed: {}", e);
    }
}

impl<R, W, S, T> Drop for Controller<R, W, S, T>
where
    R: RegisterBank,
    W: WatchdogPort,
    S: EventSink,
    T: TimePort,
{
    fn drop(&mut self) {
        if !self.torn_down {
            warn!("Controller: dropped while running, tearing down");
            if let Err(e) = self.shutdown() {
                error!("Controller: teardown failed: {}", e);
            }
        }
    }
}
