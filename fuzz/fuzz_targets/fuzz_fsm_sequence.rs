//! Fuzz target: irrigation state machine
//!
//! Each input byte is one tick: bit 0 is the moisture reading, the rest
//! is the elapsed time.  Verifies:
//! - No panics or arithmetic overflow
//! - The pump is only commanded on while in `Dry`
//! - A shutdown always ends in `Done` with the pump off
//!
//! cargo fuzz run fuzz_fsm_sequence

#![no_main]

use libfuzzer_sys::fuzz_target;
use plant_guardian::app::events::AppEvent;
use plant_guardian::app::ports::{ActuatorPort, EventSink, SensorPort};
use plant_guardian::app::service::IrrigationService;
use plant_guardian::config::LoopSettings;
use plant_guardian::error::GpioError;
use plant_guardian::fsm::StateId;
use plant_guardian::sensors::moisture::MoistureReading;

struct Hw {
    dry: bool,
    pump: bool,
}

impl SensorPort for Hw {
    fn read_moisture(&mut self) -> Result<MoistureReading, GpioError> {
        Ok(MoistureReading::from(self.dry))
    }
}

impl ActuatorPort for Hw {
    fn set_pump(&mut self, on: bool) -> Result<(), GpioError> {
        self.pump = on;
        Ok(())
    }
}

struct Null;

impl EventSink for Null {
    fn emit(&mut self, _event: &AppEvent) {}
}

fuzz_target!(|data: &[u8]| {
    let mut hw = Hw { dry: false, pump: false };
    let mut svc = IrrigationService::new(LoopSettings::default());
    svc.start(&mut Null);

    let mut now = 0u64;
    for &b in data {
        hw.dry = b & 1 == 1;
        now += u64::from(b >> 1) * 100;
        svc.tick(now, &mut hw, &mut Null);
        assert!(!hw.pump || svc.state() == StateId::Dry);
    }

    svc.shutdown(now, &mut hw, &mut Null);
    assert_eq!(svc.state(), StateId::Done);
    assert!(!hw.pump);
});
