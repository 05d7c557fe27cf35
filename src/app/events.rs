//! Outbound application events.
//!
//! The [`AppService`](super::service::AppService) emits these through the
//! [`EventSink`](super::ports::EventSink) port. Adapters on the other
//! side decide what to do with them: log to serial, encode as NMEA 2000
//! PGNs, raise Signal K notifications.
//!
//! Every categorical event is edge-triggered: it fires on a transition,
//! never on every tick.

use serde::Serialize;

use crate::classify::alarm::AlarmChannel;
use crate::classify::coolant::AlertLevel;
use crate::classify::tank::TankBand;
use crate::diagnostics::DiagnosticsReport;
use crate::fsm::FanState;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The application service has started (relay forced off).
    Started,

    /// Debounced engine running state changed.
    RunStateChanged { running: bool, rpm: f32 },

    /// The purge-fan FSM moved between states. A scheduled tick that also
    /// switches the relay follows this with `RelayChanged`; a forced stop
    /// that drops the relay emits only `RelayChanged`.
    FanStateChanged { from: FanState, to: FanState },

    /// The purge-fan relay output level changed. `state` is the state the
    /// fan is in after the change.
    RelayChanged { on: bool, state: FanState },

    /// Coolant alert category changed.
    CoolantAlertChanged { level: AlertLevel, celsius: f32 },

    /// Tank band changed (first classification included).
    TankLevelChanged { band: TankBand, percent: f32 },

    /// A voted alarm contact asserted or cleared.
    AlarmChanged { channel: AlarmChannel, asserted: bool },

    /// The analog front-end stopped answering.
    AnalogLost,

    /// The analog front-end answered again after `fail_count` failed retries
    /// (lifetime total).
    AnalogRecovered { fail_count: u32 },

    /// Periodic telemetry snapshot.
    Telemetry(TelemetryData),

    /// Periodic health report.
    Diagnostics(DiagnosticsReport),
}

/// A point-in-time telemetry snapshot for the protocol encoders.
///
/// `None` fields are "not available" and must be encoded as such.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TelemetryData {
    pub rpm: f32,
    pub engine_running: bool,
    pub fan_state: FanState,
    pub relay_on: bool,
    pub purge_remaining_secs: f32,
    pub coolant_c: Option<f32>,
    pub coolant_alert: AlertLevel,
    pub tank_band: Option<TankBand>,
    pub tank_percent: Option<f32>,
    pub tank_capacity_l: f32,
    pub oil_pressure_alarm: bool,
    pub coolant_temp_alarm: bool,
    pub ignition_on: bool,
}
