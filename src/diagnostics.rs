//! Runtime diagnostics.
//!
//! The service keeps a handful of monotonically increasing health counters
//! and folds them into a [`DiagnosticsReport`] on the diagnostics period.
//! Heap figures and the reset reason come from ESP-IDF on the device and
//! from fixed values on the host so simulation paths exercise the same
//! branches.

use serde::Serialize;

/// Crate version baked in at build time.
pub const FIRMWARE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Counters owned by the service. Never reset while running.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HealthCounters {
    /// Failed analog front-end recovery attempts.
    pub analog_fail_count: u32,
    /// Times the front-end dropped out during a read.
    pub analog_lost_count: u32,
    /// Relay output level changes.
    pub relay_changes: u32,
}

/// Why the chip last restarted, decoded from `esp_reset_reason_t`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResetReason {
    Unknown,
    PowerOn,
    External,
    Software,
    Panic,
    InterruptWatchdog,
    TaskWatchdog,
    OtherWatchdog,
    DeepSleep,
    Brownout,
    Sdio,
}

impl ResetReason {
    /// Decode the raw ESP-IDF code. Codes added by newer IDF releases read
    /// as `Unknown`.
    pub fn from_code(code: u32) -> Self {
        match code {
            1 => Self::PowerOn,
            2 => Self::External,
            3 => Self::Software,
            4 => Self::Panic,
            5 => Self::InterruptWatchdog,
            6 => Self::TaskWatchdog,
            7 => Self::OtherWatchdog,
            8 => Self::DeepSleep,
            9 => Self::Brownout,
            10 => Self::Sdio,
            _ => Self::Unknown,
        }
    }

    /// Reason for the most recent restart.
    #[cfg(target_os = "espidf")]
    pub fn current() -> Self {
        // SAFETY: reads a value latched at boot.
        let code = unsafe { esp_idf_svc::sys::esp_reset_reason() };
        Self::from_code(code as u32)
    }

    /// The host never resets; simulation always reports a power-on start.
    #[cfg(not(target_os = "espidf"))]
    pub fn current() -> Self {
        Self::PowerOn
    }

    /// Resets that point at a firmware or power fault rather than a
    /// deliberate restart.
    pub fn is_fault(self) -> bool {
        matches!(
            self,
            Self::Panic
                | Self::InterruptWatchdog
                | Self::TaskWatchdog
                | Self::OtherWatchdog
                | Self::Brownout
        )
    }
}

/// Periodic health report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiagnosticsReport {
    pub uptime_secs: u32,
    pub firmware_version: heapless::String<16>,
    pub analog_ok: bool,
    pub analog_fail_count: u32,
    pub analog_lost_count: u32,
    pub relay_changes: u32,
    pub scheduler_overruns: u32,
    pub heap_free: u32,
    pub heap_min_free: u32,
    pub reset_reason: ResetReason,
}

impl DiagnosticsReport {
    pub fn collect(
        uptime_secs: u32,
        analog_ok: bool,
        counters: HealthCounters,
        scheduler_overruns: u32,
    ) -> Self {
        let (heap_free, heap_min_free) = Self::heap();
        let mut firmware_version = heapless::String::new();
        let _ = firmware_version.push_str(&FIRMWARE_VERSION[..FIRMWARE_VERSION.len().min(16)]);

        Self {
            uptime_secs,
            firmware_version,
            analog_ok,
            analog_fail_count: counters.analog_fail_count,
            analog_lost_count: counters.analog_lost_count,
            relay_changes: counters.relay_changes,
            scheduler_overruns,
            heap_free,
            heap_min_free,
            reset_reason: ResetReason::current(),
        }
    }

    #[cfg(target_os = "espidf")]
    fn heap() -> (u32, u32) {
        use esp_idf_svc::sys::*;
        // SAFETY: plain reads of allocator statistics.
        let free = unsafe { esp_get_free_heap_size() };
        let min = unsafe { esp_get_minimum_free_heap_size() };
        (free, min)
    }

    #[cfg(not(target_os = "espidf"))]
    fn heap() -> (u32, u32) {
        let free: u32 = 180_224;
        (free, (free as f32 * 0.85) as u32)
    }

}

// ───────────────────────────────────────────────────────────────
// Panic hook
// ───────────────────────────────────────────────────────────────

/// Install a panic hook that logs the reason before the default handler
/// resets the chip.
pub fn install_panic_handler() {
    std::panic::set_hook(Box::new(|info| {
        let reason = if let Some(msg) = info.payload().downcast_ref::<&str>() {
            *msg
        } else if let Some(msg) = info.payload().downcast_ref::<String>() {
            msg.as_str()
        } else {
            "unknown panic"
        };
        let location = info
            .location()
            .map(|l| (l.file(), l.line()))
            .unwrap_or(("?", 0));

        log::error!("PANIC at {}:{}: {}", location.0, location.1, reason);
    }));
}
