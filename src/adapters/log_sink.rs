//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing one line per application event to
//! the ESP-IDF logger (UART / USB-CDC in production). Snapshots are
//! rendered as JSON so a serial capture can be replayed into tooling.

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started => info!("START | relay off"),
            AppEvent::RunStateChanged { running, rpm } => {
                info!(
                    "ENGINE | {} | rpm={:.0}",
                    if *running { "RUNNING" } else { "STOPPED" },
                    rpm
                );
            }
            AppEvent::FanStateChanged { from, to } => {
                info!("FAN | {} -> {}", from.name(), to.name());
            }
            AppEvent::RelayChanged { on, state } => {
                info!("RELAY | {} | state={}", if *on { "ON" } else { "OFF" }, state.name());
            }
            AppEvent::CoolantAlertChanged { level, celsius } => {
                info!("COOLANT | {} | {:.1}\u{00b0}C", level.as_str(), celsius);
            }
            AppEvent::TankLevelChanged { band, percent } => {
                info!("TANK | {:?} | {:.1}%", band, percent);
            }
            AppEvent::AlarmChanged { channel, asserted } => {
                if *asserted {
                    warn!("ALARM | {} ASSERTED", channel.name());
                } else {
                    info!("ALARM | {} cleared", channel.name());
                }
            }
            AppEvent::AnalogLost => warn!("ANALOG | front-end lost"),
            AppEvent::AnalogRecovered { fail_count } => {
                info!("ANALOG | recovered (failed retries: {})", fail_count);
            }
            AppEvent::Telemetry(t) => match serde_json::to_string(t) {
                Ok(json) => info!("TELEM | {}", json),
                Err(e) => warn!("TELEM | encode failed: {}", e),
            },
            AppEvent::Diagnostics(d) => match serde_json::to_string(d) {
                Ok(json) => info!("DIAG | {}", json),
                Err(e) => warn!("DIAG | encode failed: {}", e),
            },
        }
    }
}
