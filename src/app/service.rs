//! Application service: the hexagonal core.
//!
//! [`AppService`] owns every stateful component: the rate meter, run-state
//! debouncer, purge controller and the classifiers. It is the single state
//! aggregate of the monitor. Each scheduled task gets one handler and
//! touches only the components it needs. All I/O flows through port traits
//! injected at call sites, so the whole service runs against mock adapters.
//!
//! ```text
//!  AnalogPort ───────▶ ┌──────────────────────────────┐ ──▶ EventSink
//!  DigitalInputPort ──▶│          AppService          │
//!  EdgeCounter (ISR) ─▶│ rate · run state · purge FSM │
//!  Tunables ──────────▶│ coolant · tank · alarms      │
//!  RelayPort ◀─────────└──────────────────────────────┘
//! ```
//!
//! Task order inside one scheduler pass is rate → analog → alarms → fan,
//! so the fan always sees the run state computed from the freshest rate.

use std::sync::Arc;

use log::{debug, info, warn};

use crate::classify::ChangeDetector;
use crate::classify::alarm::{AlarmChannel, AlarmHistory};
use crate::classify::coolant::{AlertLevel, CoolantMonitor};
use crate::classify::tank::TankBand;
use crate::config::{SystemConfig, Tunables};
use crate::control::purge::{FanStep, PurgeController};
use crate::control::run_state::RunStateDebouncer;
use crate::diagnostics::{DiagnosticsReport, HealthCounters};
use crate::error::SensorError;
use crate::fsm::FanState;
use crate::scheduler::TaskId;
use crate::sensors::coolant_sender::SenderWindow;
use crate::sensors::pulse_rate::{EdgeCounter, PulseRateMeter};

use super::commands::AppCommand;
use super::events::{AppEvent, TelemetryData};
use super::ports::{AnalogChannel, AnalogPort, DigitalInputPort, EventSink, RelayPort, SchedulerDelegate};

// ───────────────────────────────────────────────────────────────
// AppService
// ───────────────────────────────────────────────────────────────

/// The application service orchestrates all domain logic.
pub struct AppService {
    config: SystemConfig,
    tunables: Arc<Tunables>,

    // -- Engine --
    rate: PulseRateMeter,
    run_state: RunStateDebouncer,
    running: ChangeDetector<bool>,

    // -- Purge fan --
    purge: PurgeController,

    // -- Classifiers --
    coolant: CoolantMonitor,
    tank: ChangeDetector<Option<TankBand>>,
    alarms: [AlarmHistory; 2],
    alarm_state: [ChangeDetector<bool>; 2],
    ignition_on: bool,

    // -- Health --
    analog_ok: bool,
    counters: HealthCounters,
    started_ms: u32,
}

impl AppService {
    /// Construct the service from the boot-resolved configuration.
    ///
    /// `tunables` is owned by the config store; the service only reads it.
    /// Does **not** touch the relay: call [`start`](Self::start) next.
    pub fn new(
        config: SystemConfig,
        tunables: Arc<Tunables>,
        edges: &'static EdgeCounter,
        now_ms: u32,
    ) -> Self {
        let window = SenderWindow {
            min_volts: config.coolant_volt_min,
            max_volts: config.coolant_volt_max,
        };
        let alarm = AlarmHistory::new(config.alarm_debounce_samples, config.alarm_debounce_threshold);

        Self {
            rate: PulseRateMeter::new(edges, config.rpm_smoothing_samples, now_ms),
            run_state: RunStateDebouncer::new(now_ms),
            running: ChangeDetector::new(false),
            purge: PurgeController::new(config.interval_fan_ms),
            coolant: CoolantMonitor::new(window, config.stale_timeout_ms),
            tank: ChangeDetector::new(None),
            alarms: [alarm; 2],
            alarm_state: [ChangeDetector::new(false); 2],
            ignition_on: false,
            analog_ok: true,
            counters: HealthCounters::default(),
            started_ms: now_ms,
            config,
            tunables,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Drive the relay to its safe level and announce the start.
    pub fn start(&mut self, relay: &mut impl RelayPort, sink: &mut impl EventSink) {
        relay.set_relay(self.purge.relay_on());
        sink.emit(&AppEvent::Started);
        info!("AppService started, fan {}", self.purge.state().name());
    }

    // ── Task dispatch ─────────────────────────────────────────

    /// Run the handler for one due task.
    pub fn run_task<H, S>(
        &mut self,
        task: TaskId,
        now_ms: u32,
        hw: &mut H,
        sink: &mut S,
        scheduler_overruns: u32,
    ) where
        H: AnalogPort + DigitalInputPort + RelayPort,
        S: EventSink,
    {
        match task {
            TaskId::Rate => self.tick_rate(now_ms, sink),
            TaskId::Analog => self.tick_analog(now_ms, hw, sink),
            TaskId::Alarms => self.tick_alarms(hw, sink),
            TaskId::Fan => self.tick_fan(now_ms, hw, sink),
            TaskId::Telemetry => sink.emit(&AppEvent::Telemetry(self.build_telemetry(now_ms))),
            TaskId::AnalogRetry => self.retry_analog(hw, sink),
            TaskId::Diagnostics => {
                sink.emit(&AppEvent::Diagnostics(self.build_diagnostics(now_ms, scheduler_overruns)));
            }
        }
    }

    // ── Per-task handlers ─────────────────────────────────────

    /// Pulse rate, then the run-state debounce on top of it.
    pub fn tick_rate(&mut self, now_ms: u32, sink: &mut impl EventSink) {
        let t = &self.tunables;
        let rpm = self.rate.update(now_ms, t.pulses_per_revolution.get());
        let running = self.run_state.update_rate(
            rpm,
            t.engine_running_rpm.get(),
            t.engine_debounce_ms(),
            now_ms,
        );

        if let Some(running) = self.running.update(running) {
            info!(
                "engine {} at {:.0} rpm",
                if running { "running" } else { "stopped" },
                rpm
            );
            sink.emit(&AppEvent::RunStateChanged { running, rpm });
        }
    }

    /// Coolant sender and tank thresholds. Skipped while the front-end is
    /// lost; a read error marks it lost.
    pub fn tick_analog(&mut self, now_ms: u32, hw: &mut impl AnalogPort, sink: &mut impl EventSink) {
        if !self.analog_ok {
            return;
        }

        let [coolant_v, mid_v, low_v] = match Self::read_analog(hw) {
            Ok(v) => v,
            Err(e) => {
                self.analog_ok = false;
                self.counters.analog_lost_count = self.counters.analog_lost_count.wrapping_add(1);
                warn!("analog front-end lost: {e}");
                sink.emit(&AppEvent::AnalogLost);
                return;
            }
        };

        let t = &self.tunables;
        if let Some(alert) = self.coolant.update(
            coolant_v,
            t.coolant_warn_c.get(),
            t.coolant_alarm_c.get(),
            now_ms,
        ) {
            info!("coolant {} at {:.1} °C", alert.level.as_str(), alert.celsius);
            sink.emit(&AppEvent::CoolantAlertChanged {
                level: alert.level,
                celsius: alert.celsius,
            });
        }

        let band = TankBand::from_volts(low_v, mid_v, self.config.tank_threshold_volts);
        if let Some(Some(band)) = self.tank.update(Some(band)) {
            info!("tank level {:?} ({}%)", band, band.percent());
            sink.emit(&AppEvent::TankLevelChanged {
                band,
                percent: band.percent(),
            });
        }
    }

    /// Majority-vote both alarm contacts; sample the ignition sense.
    pub fn tick_alarms(&mut self, hw: &mut impl DigitalInputPort, sink: &mut impl EventSink) {
        for (i, channel) in AlarmChannel::ALL.into_iter().enumerate() {
            let sample = hw.alarm_contact_active(channel).unwrap_or_else(|e| {
                warn!("{} contact read failed: {e}", channel.name());
                false
            });
            let asserted = self.alarms[i].push(sample);
            if let Some(asserted) = self.alarm_state[i].update(asserted) {
                if asserted {
                    warn!("{} alarm", channel.name());
                } else {
                    info!("{} alarm cleared", channel.name());
                }
                sink.emit(&AppEvent::AlarmChanged { channel, asserted });
            }
        }

        match hw.ignition_on() {
            Ok(on) => self.ignition_on = on,
            Err(e) => debug!("ignition read failed: {e}"),
        }
    }

    /// One purge-controller period. The relay level is written on every
    /// call, changed or not.
    pub fn tick_fan(&mut self, now_ms: u32, relay: &mut impl RelayPort, sink: &mut impl EventSink) {
        let step = self.purge.tick(
            self.run_state.is_running(),
            self.tunables.purge_duration_secs.get(),
            now_ms,
        );
        relay.set_relay(self.purge.relay_on());
        self.report_fan_step(step, sink);
    }

    /// Probe a lost analog front-end.
    pub fn retry_analog(&mut self, hw: &mut impl AnalogPort, sink: &mut impl EventSink) {
        if self.analog_ok {
            return;
        }
        if hw.try_recover() {
            self.analog_ok = true;
            info!(
                "analog front-end recovered after {} failed retries",
                self.counters.analog_fail_count
            );
            sink.emit(&AppEvent::AnalogRecovered {
                fail_count: self.counters.analog_fail_count,
            });
        } else {
            self.counters.analog_fail_count = self.counters.analog_fail_count.wrapping_add(1);
            debug!("analog retry failed ({})", self.counters.analog_fail_count);
        }
    }

    // ── Command handling ──────────────────────────────────────

    /// Process an external command. Returns once the command has taken
    /// effect on the hardware.
    pub fn handle_command(
        &mut self,
        cmd: AppCommand,
        relay: &mut impl RelayPort,
        sink: &mut impl EventSink,
    ) {
        match cmd {
            AppCommand::PrepareFirmwareUpdate => {
                info!("firmware update pending, forcing purge fan off");
                self.force_fan_off(relay, sink);
            }
            AppCommand::ForceFanOff => self.force_fan_off(relay, sink),
        }
    }

    // ── Queries ───────────────────────────────────────────────

    /// Build a telemetry snapshot. Coolant is withheld once stale.
    pub fn build_telemetry(&self, now_ms: u32) -> TelemetryData {
        let band = self.tank.get();
        TelemetryData {
            rpm: self.rate.rate(),
            engine_running: self.run_state.is_running(),
            fan_state: self.purge.state(),
            relay_on: self.purge.relay_on(),
            purge_remaining_secs: self.purge.remaining_secs(),
            coolant_c: self.coolant.fresh_celsius(now_ms),
            coolant_alert: self.coolant.level(),
            tank_band: band,
            tank_percent: band.map(TankBand::percent),
            tank_capacity_l: self.tunables.tank_capacity_l.get(),
            oil_pressure_alarm: self.alarm_state[0].get(),
            coolant_temp_alarm: self.alarm_state[1].get(),
            ignition_on: self.ignition_on,
        }
    }

    pub fn build_diagnostics(&self, now_ms: u32, scheduler_overruns: u32) -> DiagnosticsReport {
        DiagnosticsReport::collect(
            now_ms.wrapping_sub(self.started_ms) / 1000,
            self.analog_ok,
            self.counters,
            scheduler_overruns,
        )
    }

    pub fn rpm(&self) -> f32 {
        self.rate.rate()
    }

    pub fn engine_running(&self) -> bool {
        self.run_state.is_running()
    }

    pub fn fan_state(&self) -> FanState {
        self.purge.state()
    }

    pub fn relay_on(&self) -> bool {
        self.purge.relay_on()
    }

    pub fn coolant_level(&self) -> AlertLevel {
        self.coolant.level()
    }

    pub fn tank_band(&self) -> Option<TankBand> {
        self.tank.get()
    }

    pub fn alarm_asserted(&self, channel: AlarmChannel) -> bool {
        self.alarm_state[channel as usize].get()
    }

    pub fn analog_ok(&self) -> bool {
        self.analog_ok
    }

    pub fn counters(&self) -> HealthCounters {
        self.counters
    }

    pub fn config(&self) -> &SystemConfig {
        &self.config
    }

    // ── Internal ──────────────────────────────────────────────

    fn read_analog(hw: &mut impl AnalogPort) -> Result<[f32; 3], SensorError> {
        Ok([
            hw.read_volts(AnalogChannel::CoolantSender)?,
            hw.read_volts(AnalogChannel::TankMid)?,
            hw.read_volts(AnalogChannel::TankLow)?,
        ])
    }

    /// A forced stop produces a single notification: `RelayChanged` when
    /// the relay dropped (it names the new state), else `FanStateChanged`.
    fn force_fan_off(&mut self, relay: &mut impl RelayPort, sink: &mut impl EventSink) {
        let step = self.purge.force_off();
        relay.set_relay(false);
        if step.relay_changed {
            self.report_relay_change(step, sink);
        } else if step.state_changed() {
            sink.emit(&AppEvent::FanStateChanged {
                from: step.from,
                to: step.to,
            });
        }
    }

    fn report_fan_step(&mut self, step: FanStep, sink: &mut impl EventSink) {
        if step.state_changed() {
            sink.emit(&AppEvent::FanStateChanged {
                from: step.from,
                to: step.to,
            });
        }
        if step.relay_changed {
            self.report_relay_change(step, sink);
        }
    }

    fn report_relay_change(&mut self, step: FanStep, sink: &mut impl EventSink) {
        self.counters.relay_changes = self.counters.relay_changes.wrapping_add(1);
        info!("purge fan relay {}", if step.relay_on { "ON" } else { "OFF" });
        sink.emit(&AppEvent::RelayChanged {
            on: step.relay_on,
            state: step.to,
        });
    }
}

// ───────────────────────────────────────────────────────────────
// Scheduler delegate
// ───────────────────────────────────────────────────────────────

/// Binds the service to its adapters for one scheduler pass.
pub struct TaskRunner<'a, H, S> {
    pub app: &'a mut AppService,
    pub hw: &'a mut H,
    pub sink: &'a mut S,
    /// Overrun count reported by the diagnostics task.
    pub scheduler_overruns: u32,
}

impl<H, S> SchedulerDelegate for TaskRunner<'_, H, S>
where
    H: AnalogPort + DigitalInputPort + RelayPort,
    S: EventSink,
{
    fn on_task_due(&mut self, task: TaskId, now_ms: u32) {
        self.app
            .run_task(task, now_ms, &mut *self.hw, &mut *self.sink, self.scheduler_overruns);
    }
}
