//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ AppService (domain)
//! ```
//!
//! Driven adapters (ADC front-end, GPIO, relay, event sinks, config store)
//! implement these traits. The [`AppService`](super::service::AppService)
//! consumes them via generics, so the domain core never touches hardware
//! directly.
//!
//! All port errors are typed: callers handle every variant explicitly.

use crate::classify::alarm::AlarmChannel;
use crate::config::SystemConfig;
use crate::error::SensorError;
use crate::scheduler::TaskId;

// ───────────────────────────────────────────────────────────────
// Analog port (driven adapter: ADS1115 → domain)
// ───────────────────────────────────────────────────────────────

/// Analog inputs wired to the ADS1115.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalogChannel {
    /// A0: coolant temperature sender.
    CoolantSender,
    /// A1: tank threshold sensor mounted at ¾ (below = mid band or lower).
    TankMid,
    /// A2: tank threshold sensor mounted at ¼ (below = low band).
    TankLow,
}

impl AnalogChannel {
    /// ADS1115 single-ended input number.
    pub fn input(self) -> u8 {
        match self {
            Self::CoolantSender => 0,
            Self::TankMid => 1,
            Self::TankLow => 2,
        }
    }
}

/// On-demand analog sampling. No buffering is expected from the source.
pub trait AnalogPort {
    /// Sample one channel, in volts.
    fn read_volts(&mut self, channel: AnalogChannel) -> Result<f32, SensorError>;

    /// Try to bring a lost front-end back. `true` once it answers again.
    fn try_recover(&mut self) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Digital input port (driven adapter: GPIO → domain)
// ───────────────────────────────────────────────────────────────

pub trait DigitalInputPort {
    /// Raw alarm contact level, already translated for polarity:
    /// `true` = alarm condition present.
    fn alarm_contact_active(&mut self, channel: AlarmChannel) -> Result<bool, SensorError>;

    /// Ignition key sense.
    fn ignition_on(&mut self) -> Result<bool, SensorError>;
}

// ───────────────────────────────────────────────────────────────
// Relay port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port for the purge-fan relay.
pub trait RelayPort {
    /// Drive the relay. Adapters handle output polarity.
    fn set_relay(&mut self, energised: bool);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port. Adapters decide where they go (serial log, NMEA 2000
/// encoder, Signal K notifications).
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Clock port
// ───────────────────────────────────────────────────────────────

/// Monotonic millisecond clock. Wraps after ~49.7 days; every consumer
/// uses `wrapping_sub`.
pub trait ClockPort {
    fn now_ms(&self) -> u32;
}

// ───────────────────────────────────────────────────────────────
// Configuration port (driven adapter: domain ↔ persistent config)
// ───────────────────────────────────────────────────────────────

/// Loads and persists system configuration.
///
/// Implementations MUST validate config values before persisting.
/// Invalid ranges are rejected with [`ConfigError::ValidationFailed`],
/// not silently clamped.
pub trait ConfigPort {
    /// Load configuration from persistent storage.
    /// Fails with [`ConfigError::NotFound`] if no config was ever saved.
    fn load(&self) -> Result<SystemConfig, ConfigError>;

    /// Validate and persist configuration.
    fn save(&self, config: &SystemConfig) -> Result<(), ConfigError>;
}

// ───────────────────────────────────────────────────────────────
// Scheduler delegate (decouples scheduler from the service)
// ───────────────────────────────────────────────────────────────

/// Callback the [`Scheduler`](crate::scheduler::Scheduler) invokes for each
/// due task, in declaration order.
pub trait SchedulerDelegate {
    fn on_task_due(&mut self, task: TaskId, now_ms: u32);
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`ConfigPort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// No config found in storage (first boot).
    NotFound,
    /// Stored config failed deserialization.
    Corrupted,
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
    /// Underlying storage is full.
    StorageFull,
    /// Generic I/O error from the storage backend.
    IoError,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "config not found"),
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::StorageFull => write!(f, "storage full"),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}
