//! System configuration parameters
//!
//! [`SystemConfig`] holds every compile-time default for the engine-room
//! monitor. It is resolved once at boot (defaults, optionally overridden by
//! the external config store) and never mutated by the core afterwards.
//!
//! Values that the operator may change while the firmware runs live in
//! [`Tunables`]: one [`ParamCell`] per parameter. The config store owns the
//! cells and writes them; the core only ever reads the current value, fresh
//! on each use.

use core::sync::atomic::{AtomicU32, Ordering};

use serde::{Deserialize, Serialize};

use crate::app::ports::ConfigError;

/// Upper bound on the RPM moving-average window.
pub const MAX_RPM_SMOOTHING_SAMPLES: usize = 20;

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemConfig {
    // --- Engine / RPM ---
    /// W-terminal pulses per crankshaft revolution.
    pub pulses_per_revolution: f32,
    /// RPM above which the engine counts as running.
    pub engine_running_rpm: f32,
    /// Moving-average window (samples) applied to the raw RPM.
    pub rpm_smoothing_samples: u8,
    /// Stable time (ms) required before the running state is trusted.
    pub engine_debounce_ms: u32,

    // --- Purge fan ---
    /// Fan run time after the engine stops (seconds).
    pub purge_duration_secs: f32,
    /// Relay module energises on a HIGH output.
    pub relay_active_high: bool,

    // --- Tank ---
    /// Tank capacity reported alongside the level (litres).
    pub tank_capacity_l: f32,
    /// Threshold comparator output below this voltage = threshold reached.
    pub tank_threshold_volts: f32,

    // --- Coolant ---
    /// Sender voltage below this is an open/shorted sender.
    pub coolant_volt_min: f32,
    /// Sender voltage above this is an open/shorted sender.
    pub coolant_volt_max: f32,
    /// Warn notification threshold (°C).
    pub coolant_warn_c: f32,
    /// Alarm notification threshold (°C).
    pub coolant_alarm_c: f32,
    /// A coolant reading older than this is reported as not available.
    pub stale_timeout_ms: u32,

    // --- Alarm contacts ---
    /// Shift-register depth (K) of the majority vote.
    pub alarm_debounce_samples: u8,
    /// Set samples (M of K) required to assert.
    pub alarm_debounce_threshold: u8,

    // --- Task periods (milliseconds) ---
    pub interval_rpm_ms: u32,
    pub interval_analog_ms: u32,
    pub interval_alarm_ms: u32,
    pub interval_fan_ms: u32,
    pub interval_telemetry_ms: u32,
    pub interval_analog_retry_ms: u32,
    pub interval_diagnostics_ms: u32,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            // Engine
            pulses_per_revolution: 10.0,
            engine_running_rpm: 200.0,
            rpm_smoothing_samples: 5,
            engine_debounce_ms: 5000,

            // Purge fan
            purge_duration_secs: 600.0, // 10 min
            relay_active_high: true,

            // Tank
            tank_capacity_l: 100.0,
            tank_threshold_volts: 1.5,

            // Coolant
            coolant_volt_min: 0.50,
            coolant_volt_max: 3.50,
            coolant_warn_c: 95.0,
            coolant_alarm_c: 105.0,
            stale_timeout_ms: 5000,

            // Alarm contacts: 4-of-5
            alarm_debounce_samples: 5,
            alarm_debounce_threshold: 4,

            // Timing
            interval_rpm_ms: 100,            // 10 Hz
            interval_analog_ms: 200,         // 5 Hz
            interval_alarm_ms: 500,          // 2 Hz
            interval_fan_ms: 1000,           // 1 Hz
            interval_telemetry_ms: 1000,     // 1 Hz
            interval_analog_retry_ms: 5000,  // ADS1115 recovery
            interval_diagnostics_ms: 10_000, // heartbeat
        }
    }
}

impl SystemConfig {
    /// Range-check every field. Rejects rather than clamps.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.pulses_per_revolution.is_finite() && self.pulses_per_revolution > 0.0) {
            return Err(ConfigError::ValidationFailed(
                "pulses_per_revolution must be > 0",
            ));
        }
        if !(self.engine_running_rpm.is_finite() && self.engine_running_rpm >= 0.0) {
            return Err(ConfigError::ValidationFailed(
                "engine_running_rpm must be >= 0",
            ));
        }
        if self.rpm_smoothing_samples == 0
            || self.rpm_smoothing_samples as usize > MAX_RPM_SMOOTHING_SAMPLES
        {
            return Err(ConfigError::ValidationFailed(
                "rpm_smoothing_samples must be 1–20",
            ));
        }
        if !(self.purge_duration_secs.is_finite() && self.purge_duration_secs >= 0.0) {
            return Err(ConfigError::ValidationFailed(
                "purge_duration_secs must be >= 0",
            ));
        }
        if !(self.tank_capacity_l.is_finite() && self.tank_capacity_l >= 0.0) {
            return Err(ConfigError::ValidationFailed("tank_capacity_l must be >= 0"));
        }
        if !(self.tank_threshold_volts.is_finite() && self.tank_threshold_volts > 0.0) {
            return Err(ConfigError::ValidationFailed("tank_threshold_volts must be > 0"));
        }
        if !(self.coolant_volt_min.is_finite() && self.coolant_volt_max.is_finite())
            || self.coolant_volt_min >= self.coolant_volt_max
        {
            return Err(ConfigError::ValidationFailed(
                "coolant_volt_min must be < coolant_volt_max",
            ));
        }
        if !(self.coolant_warn_c.is_finite() && self.coolant_alarm_c.is_finite())
            || self.coolant_warn_c >= self.coolant_alarm_c
        {
            return Err(ConfigError::ValidationFailed(
                "coolant_warn_c must be < coolant_alarm_c",
            ));
        }
        if !(1..=8).contains(&self.alarm_debounce_samples) {
            return Err(ConfigError::ValidationFailed(
                "alarm_debounce_samples must be 1–8",
            ));
        }
        if self.alarm_debounce_threshold == 0
            || self.alarm_debounce_threshold > self.alarm_debounce_samples
        {
            return Err(ConfigError::ValidationFailed(
                "alarm_debounce_threshold must be 1–alarm_debounce_samples",
            ));
        }
        let periods = [
            self.interval_rpm_ms,
            self.interval_analog_ms,
            self.interval_alarm_ms,
            self.interval_fan_ms,
            self.interval_telemetry_ms,
            self.interval_analog_retry_ms,
            self.interval_diagnostics_ms,
        ];
        if periods.contains(&0) {
            return Err(ConfigError::ValidationFailed("task intervals must be > 0"));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Runtime-adjustable parameters
// ---------------------------------------------------------------------------

/// A single runtime-adjustable scalar.
///
/// Stored as `f32` bits in an `AtomicU32` so that the config store (web UI,
/// RPC, NVS reload) can write it from any context while the scheduler reads
/// it without locking.
#[derive(Debug)]
pub struct ParamCell(AtomicU32);

impl ParamCell {
    pub const fn new(bits: u32) -> Self {
        Self(AtomicU32::new(bits))
    }

    pub fn from_f32(value: f32) -> Self {
        Self::new(value.to_bits())
    }

    /// Current value.
    pub fn get(&self) -> f32 {
        f32::from_bits(self.0.load(Ordering::Relaxed))
    }

    /// Overwrite the value. Only the external config store calls this.
    pub fn set(&self, value: f32) {
        self.0.store(value.to_bits(), Ordering::Relaxed);
    }
}

/// Externally-owned runtime parameters read fresh by the core.
#[derive(Debug)]
pub struct Tunables {
    pub purge_duration_secs: ParamCell,
    pub pulses_per_revolution: ParamCell,
    pub engine_running_rpm: ParamCell,
    pub engine_debounce_ms: ParamCell,
    pub coolant_warn_c: ParamCell,
    pub coolant_alarm_c: ParamCell,
    pub tank_capacity_l: ParamCell,
}

impl Tunables {
    pub fn from_config(config: &SystemConfig) -> Self {
        Self {
            purge_duration_secs: ParamCell::from_f32(config.purge_duration_secs),
            pulses_per_revolution: ParamCell::from_f32(config.pulses_per_revolution),
            engine_running_rpm: ParamCell::from_f32(config.engine_running_rpm),
            engine_debounce_ms: ParamCell::from_f32(config.engine_debounce_ms as f32),
            coolant_warn_c: ParamCell::from_f32(config.coolant_warn_c),
            coolant_alarm_c: ParamCell::from_f32(config.coolant_alarm_c),
            tank_capacity_l: ParamCell::from_f32(config.tank_capacity_l),
        }
    }

    /// Push a validated config into the cells. Invalid configs leave every
    /// cell untouched.
    pub fn apply(&self, config: &SystemConfig) -> Result<(), ConfigError> {
        config.validate()?;
        self.purge_duration_secs.set(config.purge_duration_secs);
        self.pulses_per_revolution.set(config.pulses_per_revolution);
        self.engine_running_rpm.set(config.engine_running_rpm);
        self.engine_debounce_ms.set(config.engine_debounce_ms as f32);
        self.coolant_warn_c.set(config.coolant_warn_c);
        self.coolant_alarm_c.set(config.coolant_alarm_c);
        self.tank_capacity_l.set(config.tank_capacity_l);
        Ok(())
    }

    /// Debounce window as whole milliseconds (negative values read as zero).
    pub fn engine_debounce_ms(&self) -> u32 {
        self.engine_debounce_ms.get().max(0.0) as u32
    }
}

impl Default for Tunables {
    fn default() -> Self {
        Self::from_config(&SystemConfig::default())
    }
}
