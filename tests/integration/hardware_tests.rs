//! HardwareAdapter + ADS1115 driver against embedded-hal mocks.

use std::rc::Rc;
use std::sync::Arc;

use super::mock_hw::{FaultyPin, MockAds1115, MockPin, RecordingSink};

use enginemon::adapters::hardware::HardwareAdapter;
use enginemon::app::events::AppEvent;
use enginemon::app::ports::{AnalogChannel, AnalogPort, DigitalInputPort, RelayPort};
use enginemon::app::service::AppService;
use enginemon::classify::alarm::AlarmChannel;
use enginemon::classify::tank::TankBand;
use enginemon::config::{SystemConfig, Tunables};
use enginemon::error::SensorError;
use enginemon::pins::ADS1115_ADDR;
use enginemon::scheduler::TaskId;
use enginemon::sensors::ads1115::Ads1115;
use enginemon::sensors::pulse_rate::EdgeCounter;

type Adapter = HardwareAdapter<MockAds1115, MockPin, MockPin, MockPin, MockPin>;

/// Raw codes: A0 = 2.5 V, A1 = A2 = 3.0 V.
const RAW: [i16; 4] = [20_000, 24_000, 24_000, 0];

struct Pins {
    oil: MockPin,
    temp: MockPin,
    ignition: MockPin,
    relay: MockPin,
}

fn adapter(bus: MockAds1115, relay_active_high: bool) -> (Adapter, Pins) {
    let pins = Pins {
        oil: MockPin::new(true),
        temp: MockPin::new(true),
        ignition: MockPin::new(false),
        relay: MockPin::new(!relay_active_high),
    };
    let hw = HardwareAdapter::new(
        Ads1115::new(bus, ADS1115_ADDR),
        pins.oil.clone(),
        pins.temp.clone(),
        pins.ignition.clone(),
        pins.relay.clone(),
        relay_active_high,
    );
    (hw, pins)
}

#[test]
fn reads_each_channel_in_volts() {
    let (mut hw, _) = adapter(MockAds1115::new(RAW), true);

    let coolant = hw.read_volts(AnalogChannel::CoolantSender).unwrap();
    assert!((coolant - 2.5).abs() < 1e-4, "coolant = {coolant}");
    let low = hw.read_volts(AnalogChannel::TankLow).unwrap();
    assert!((low - 3.0).abs() < 1e-4, "low = {low}");

    let bus = hw.release_adc().release();
    assert_eq!(bus.last_config, Some(Ads1115::<MockAds1115>::config_word(2)));
}

#[test]
fn missing_chip_is_unavailable_then_recovers() {
    let bus = MockAds1115::new(RAW);
    let present = Rc::clone(&bus.present);
    present.set(false);
    let (mut hw, _) = adapter(bus, true);

    assert_eq!(
        hw.read_volts(AnalogChannel::CoolantSender),
        Err(SensorError::AnalogUnavailable)
    );
    assert!(!hw.try_recover());

    present.set(true);
    assert!(hw.try_recover());
    assert!(hw.read_volts(AnalogChannel::TankMid).is_ok());
}

#[test]
fn conversion_that_never_finishes_times_out() {
    let mut bus = MockAds1115::new(RAW);
    bus.stuck_busy = true;
    let (mut hw, _) = adapter(bus, true);
    assert_eq!(
        hw.read_volts(AnalogChannel::CoolantSender),
        Err(SensorError::ConversionTimeout)
    );
}

#[test]
fn alarm_contacts_are_active_low() {
    let (mut hw, pins) = adapter(MockAds1115::new(RAW), true);

    assert!(!hw.alarm_contact_active(AlarmChannel::OilPressure).unwrap());
    pins.oil.level.set(false);
    assert!(hw.alarm_contact_active(AlarmChannel::OilPressure).unwrap());
    assert!(!hw.alarm_contact_active(AlarmChannel::CoolantTemp).unwrap());

    assert!(!hw.ignition_on().unwrap());
    pins.ignition.level.set(true);
    assert!(hw.ignition_on().unwrap());
}

#[test]
fn failed_contact_read_is_reported_per_channel() {
    let temp = MockPin::new(false);
    let mut hw = HardwareAdapter::new(
        Ads1115::new(MockAds1115::new(RAW), ADS1115_ADDR),
        FaultyPin,
        temp.clone(),
        MockPin::new(false),
        MockPin::new(false),
        true,
    );

    assert_eq!(
        hw.alarm_contact_active(AlarmChannel::OilPressure),
        Err(SensorError::GpioReadFailed)
    );
    assert_eq!(hw.alarm_contact_active(AlarmChannel::CoolantTemp), Ok(true));
    temp.level.set(true);
    assert_eq!(hw.alarm_contact_active(AlarmChannel::CoolantTemp), Ok(false));
}

#[test]
fn relay_polarity_follows_config() {
    let (mut hw, pins) = adapter(MockAds1115::new(RAW), true);
    hw.set_relay(true);
    assert!(pins.relay.level.get());
    hw.set_relay(false);
    assert!(!pins.relay.level.get());

    let (mut hw, pins) = adapter(MockAds1115::new(RAW), false);
    hw.set_relay(true);
    assert!(!pins.relay.level.get());
    hw.set_relay(false);
    assert!(pins.relay.level.get());
}

#[test]
fn service_runs_against_real_adapter() {
    static EDGES: EdgeCounter = EdgeCounter::new();
    let (mut hw, pins) = adapter(MockAds1115::new(RAW), true);
    let mut sink = RecordingSink::default();
    let mut app = AppService::new(
        SystemConfig::default(),
        Arc::new(Tunables::default()),
        &EDGES,
        0,
    );

    app.start(&mut hw, &mut sink);
    assert!(!pins.relay.level.get());

    app.run_task(TaskId::Analog, 200, &mut hw, &mut sink, 0);
    assert_eq!(app.tank_band(), Some(TankBand::High));
    assert!(sink.events.contains(&AppEvent::TankLevelChanged {
        band: TankBand::High,
        percent: 87.5,
    }));

    app.run_task(TaskId::Telemetry, 1_000, &mut hw, &mut sink, 0);
    let t = sink.last_telemetry().expect("telemetry");
    assert!(matches!(t.coolant_c, Some(c) if (c - 60.0).abs() < 0.01));
}
