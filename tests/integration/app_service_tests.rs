//! Integration tests for the scheduler → AppService → ports pipeline.
//!
//! Every test drives the real scheduler and service on a simulated clock
//! with 100 ms steps. W-terminal edges are injected into a per-test
//! `EdgeCounter`, exactly as the ISR would.

use super::mock_hw::Rig;

use enginemon::app::commands::AppCommand;
use enginemon::app::events::AppEvent;
use enginemon::app::ports::AnalogChannel;
use enginemon::classify::alarm::AlarmChannel;
use enginemon::classify::coolant::AlertLevel;
use enginemon::classify::tank::TankBand;
use enginemon::fsm::FanState;
use enginemon::sensors::pulse_rate::EdgeCounter;

/// 25 edges per 100 ms at 10 pulses/rev = 1500 rpm.
const RUNNING_EDGES: u32 = 25;

/// Run the engine long enough to debounce, then stop it and wait for the
/// stop to debounce. Returns with the fan just entered `Purge` (16 000 ms).
fn start_and_stop(rig: &mut Rig) {
    rig.run(10_000, RUNNING_EDGES);
    rig.run(16_000, 0);
    assert_eq!(rig.app.fan_state(), FanState::Purge);
}

// ── Engine cycle ──────────────────────────────────────────────

#[test]
fn engine_cycle_runs_purge_for_configured_duration() {
    static EDGES: EdgeCounter = EdgeCounter::new();
    let mut rig = Rig::new(&EDGES);
    rig.tunables.purge_duration_secs.set(5.0);

    rig.run(5_000, RUNNING_EDGES);
    assert!(!rig.app.engine_running(), "debounce window not yet elapsed");

    rig.run(10_000, RUNNING_EDGES);
    assert!(rig.app.engine_running());
    assert!((rig.app.rpm() - 1500.0).abs() < 1.0, "rpm = {}", rig.app.rpm());
    assert_eq!(rig.app.fan_state(), FanState::Running);
    assert!(!rig.hw.relay());

    // Rate drops to zero at 10 500; the stop debounces at 15 500 and the
    // next fan tick (16 000) starts the purge.
    rig.run(15_900, 0);
    assert!(!rig.app.engine_running());
    assert_eq!(rig.app.fan_state(), FanState::Running);

    rig.run(16_000, 0);
    assert_eq!(rig.app.fan_state(), FanState::Purge);
    assert!(rig.hw.relay());

    rig.run(30_000, 0);
    assert_eq!(rig.app.fan_state(), FanState::Idle);
    assert!(!rig.hw.relay());
    assert_eq!(rig.hw.relay_on_writes(), 5, "ceil(5 s / 1 s) ticks with relay on");

    assert_eq!(
        rig.sink.relay_events(),
        vec![
            &AppEvent::RelayChanged { on: true, state: FanState::Purge },
            &AppEvent::RelayChanged { on: false, state: FanState::Idle },
        ]
    );
    assert_eq!(
        rig.sink.count(|e| matches!(e, AppEvent::RunStateChanged { .. })),
        2
    );
    assert_eq!(rig.app.counters().relay_changes, 2);
}

#[test]
fn engine_restart_aborts_purge() {
    static EDGES: EdgeCounter = EdgeCounter::new();
    let mut rig = Rig::new(&EDGES);
    rig.tunables.purge_duration_secs.set(60.0);

    start_and_stop(&mut rig);

    // Restart: debounced running at 21 100, fan reacts at 22 000.
    rig.run(22_000, RUNNING_EDGES);
    assert_eq!(rig.app.fan_state(), FanState::Running);
    assert!(!rig.hw.relay());
    assert_eq!(rig.hw.relay_on_writes(), 6);
    assert!(rig.sink.events.contains(&AppEvent::FanStateChanged {
        from: FanState::Purge,
        to: FanState::Running,
    }));
}

#[test]
fn short_engine_blip_never_starts_fan_cycle() {
    static EDGES: EdgeCounter = EdgeCounter::new();
    let mut rig = Rig::new(&EDGES);

    rig.run(3_000, RUNNING_EDGES);
    rig.run(20_000, 0);
    assert!(!rig.app.engine_running());
    assert_eq!(rig.app.fan_state(), FanState::Idle);
    assert_eq!(rig.hw.relay_on_writes(), 0);
    assert!(rig.sink.relay_events().is_empty());
}

#[test]
fn zero_purge_duration_skips_purge() {
    static EDGES: EdgeCounter = EdgeCounter::new();
    let mut rig = Rig::new(&EDGES);
    rig.tunables.purge_duration_secs.set(0.0);

    rig.run(10_000, RUNNING_EDGES);
    rig.run(16_000, 0);
    assert_eq!(rig.app.fan_state(), FanState::Idle);
    assert_eq!(rig.hw.relay_on_writes(), 0);
}

#[test]
fn relay_is_written_every_fan_tick() {
    static EDGES: EdgeCounter = EdgeCounter::new();
    let mut rig = Rig::new(&EDGES);
    rig.run(10_000, 0);
    // One write from start(), then one per fan period.
    assert_eq!(rig.hw.relay_writes.len(), 11);
    assert!(rig.hw.relay_writes.iter().all(|&on| !on));
}

// ── Commands ──────────────────────────────────────────────────

#[test]
fn firmware_update_forces_fan_off_during_purge() {
    static EDGES: EdgeCounter = EdgeCounter::new();
    let mut rig = Rig::new(&EDGES);
    rig.tunables.purge_duration_secs.set(60.0);
    start_and_stop(&mut rig);
    assert!(rig.hw.relay());
    let before = rig.sink.events.len();

    rig.app
        .handle_command(AppCommand::PrepareFirmwareUpdate, &mut rig.hw, &mut rig.sink);
    assert!(!rig.hw.relay(), "relay must be off when the command returns");
    assert_eq!(rig.app.fan_state(), FanState::Idle);
    assert_eq!(
        &rig.sink.events[before..],
        &[AppEvent::RelayChanged { on: false, state: FanState::Idle }]
    );

    rig.run(30_000, 0);
    assert_eq!(rig.app.fan_state(), FanState::Idle);
    assert_eq!(rig.hw.relay_on_writes(), 1);
}

#[test]
fn force_off_while_running_reports_state_only() {
    static EDGES: EdgeCounter = EdgeCounter::new();
    let mut rig = Rig::new(&EDGES);
    rig.run(10_000, RUNNING_EDGES);
    assert_eq!(rig.app.fan_state(), FanState::Running);
    let before = rig.sink.events.len();

    rig.app
        .handle_command(AppCommand::ForceFanOff, &mut rig.hw, &mut rig.sink);
    assert_eq!(
        &rig.sink.events[before..],
        &[AppEvent::FanStateChanged { from: FanState::Running, to: FanState::Idle }]
    );

    rig.app
        .handle_command(AppCommand::ForceFanOff, &mut rig.hw, &mut rig.sink);
    assert_eq!(rig.sink.events.len(), before + 1);
}

// ── Analog front-end ──────────────────────────────────────────

#[test]
fn analog_loss_and_recovery() {
    static EDGES: EdgeCounter = EdgeCounter::new();
    let mut rig = Rig::new(&EDGES);
    rig.hw.analog_down = true;
    rig.hw.recover_ok = false;

    rig.run(5_000, 0);
    assert!(!rig.app.analog_ok());
    assert_eq!(rig.sink.count(|e| *e == AppEvent::AnalogLost), 1);
    assert_eq!(rig.app.counters().analog_fail_count, 1);

    rig.hw.recover_ok = true;
    rig.run(10_000, 0);
    assert!(rig.app.analog_ok());
    assert!(rig
        .sink
        .events
        .contains(&AppEvent::AnalogRecovered { fail_count: 1 }));

    let diag = rig
        .sink
        .events
        .iter()
        .rev()
        .find_map(|e| match e {
            AppEvent::Diagnostics(d) => Some(d.clone()),
            _ => None,
        })
        .expect("diagnostics at 10 s");
    assert!(diag.analog_ok);
    assert_eq!(diag.analog_fail_count, 1);
    assert_eq!(diag.analog_lost_count, 1);
    assert_eq!(diag.uptime_secs, 10);
}

#[test]
fn coolant_goes_stale_after_front_end_loss() {
    static EDGES: EdgeCounter = EdgeCounter::new();
    let mut rig = Rig::new(&EDGES);

    rig.run(1_000, 0);
    let c = rig.sink.last_telemetry().and_then(|t| t.coolant_c);
    assert!(matches!(c, Some(v) if (v - 60.0).abs() < 0.01), "coolant = {c:?}");

    rig.hw.analog_down = true;
    rig.hw.recover_ok = false;
    rig.run(6_000, 0);
    assert!(rig.sink.last_telemetry().and_then(|t| t.coolant_c).is_some());

    rig.run(7_000, 0);
    assert_eq!(rig.sink.last_telemetry().and_then(|t| t.coolant_c), None);
}

#[test]
fn sender_fault_is_not_available_immediately() {
    static EDGES: EdgeCounter = EdgeCounter::new();
    let mut rig = Rig::new(&EDGES);
    rig.run(1_000, 0);

    rig.hw.set_volts(AnalogChannel::CoolantSender, 4.2);
    rig.run(2_000, 0);
    let t = rig.sink.last_telemetry().expect("telemetry");
    assert_eq!(t.coolant_c, None);
    assert_eq!(t.coolant_alert, AlertLevel::Normal);
}

#[test]
fn coolant_alert_transitions_are_edge_triggered() {
    static EDGES: EdgeCounter = EdgeCounter::new();
    let mut rig = Rig::new(&EDGES);

    // 1.0 V → 108 °C.
    rig.hw.set_volts(AnalogChannel::CoolantSender, 1.0);
    rig.run(2_000, 0);
    assert_eq!(rig.app.coolant_level(), AlertLevel::Alarm);
    assert_eq!(
        rig.sink.count(|e| matches!(
            e,
            AppEvent::CoolantAlertChanged { level: AlertLevel::Alarm, .. }
        )),
        1
    );

    rig.hw.set_volts(AnalogChannel::CoolantSender, 2.5);
    rig.run(3_000, 0);
    assert_eq!(rig.app.coolant_level(), AlertLevel::Normal);
    assert_eq!(
        rig.sink.count(|e| matches!(e, AppEvent::CoolantAlertChanged { .. })),
        2
    );
}

#[test]
fn tank_band_reported_on_first_read_and_changes() {
    static EDGES: EdgeCounter = EdgeCounter::new();
    let mut rig = Rig::new(&EDGES);

    rig.run(1_000, 0);
    assert_eq!(rig.app.tank_band(), Some(TankBand::High));
    assert_eq!(
        rig.sink.count(|e| matches!(e, AppEvent::TankLevelChanged { .. })),
        1
    );

    rig.hw.set_volts(AnalogChannel::TankMid, 0.3);
    rig.run(1_200, 0);
    assert!(rig.sink.events.contains(&AppEvent::TankLevelChanged {
        band: TankBand::Mid,
        percent: 50.0,
    }));

    rig.hw.set_volts(AnalogChannel::TankLow, 0.3);
    rig.run(2_000, 0);
    let t = rig.sink.last_telemetry().expect("telemetry");
    assert_eq!(t.tank_band, Some(TankBand::Low));
    assert_eq!(t.tank_percent, Some(12.5));
    assert_eq!(t.tank_capacity_l, 100.0);
}

// ── Alarm contacts ────────────────────────────────────────────

#[test]
fn oil_pressure_alarm_needs_four_of_five() {
    static EDGES: EdgeCounter = EdgeCounter::new();
    let mut rig = Rig::new(&EDGES);

    rig.hw.set_contact(AlarmChannel::OilPressure, true);
    rig.run(1_500, 0);
    assert!(!rig.app.alarm_asserted(AlarmChannel::OilPressure));

    rig.run(2_000, 0);
    assert!(rig.app.alarm_asserted(AlarmChannel::OilPressure));
    assert!(!rig.app.alarm_asserted(AlarmChannel::CoolantTemp));
    assert!(rig.sink.last_telemetry().is_some_and(|t| t.oil_pressure_alarm));

    rig.hw.set_contact(AlarmChannel::OilPressure, false);
    rig.run(2_500, 0);
    assert!(rig.app.alarm_asserted(AlarmChannel::OilPressure));
    rig.run(3_000, 0);
    assert!(!rig.app.alarm_asserted(AlarmChannel::OilPressure));

    assert_eq!(
        rig.sink.count(|e| matches!(
            e,
            AppEvent::AlarmChanged { channel: AlarmChannel::OilPressure, .. }
        )),
        2
    );
}

#[test]
fn single_contact_glitch_is_ignored() {
    static EDGES: EdgeCounter = EdgeCounter::new();
    let mut rig = Rig::new(&EDGES);

    rig.run(1_000, 0);
    rig.hw.set_contact(AlarmChannel::CoolantTemp, true);
    rig.run(1_500, 0);
    rig.hw.set_contact(AlarmChannel::CoolantTemp, false);
    rig.run(5_000, 0);

    assert!(!rig.app.alarm_asserted(AlarmChannel::CoolantTemp));
    assert_eq!(
        rig.sink.count(|e| matches!(e, AppEvent::AlarmChanged { .. })),
        0
    );
}

#[test]
fn telemetry_carries_ignition_and_fan_state() {
    static EDGES: EdgeCounter = EdgeCounter::new();
    let mut rig = Rig::new(&EDGES);
    rig.hw.ignition = true;
    rig.run(1_000, 0);

    let t = rig.sink.last_telemetry().expect("telemetry");
    assert!(t.ignition_on);
    assert_eq!(t.fan_state, FanState::Idle);
    assert!(!t.relay_on);
    assert_eq!(t.purge_remaining_secs, 0.0);
}
