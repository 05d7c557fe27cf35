//! Context threaded through every fan state handler.
//!
//! Inputs (`engine_running`, `purge_duration_secs`) are written by
//! [`PurgeController`](crate::control::purge::PurgeController) before each
//! tick and `dt_ms` is fixed at construction; outputs (`relay_on`, `remaining_ms`) are written only by the state
//! handlers.

/// The shared context passed to every state handler function.
#[derive(Debug, Clone)]
pub struct FanContext {
    // -- Inputs --
    /// Debounced engine running state.
    pub engine_running: bool,
    /// Currently configured purge duration. Sampled once on entry to
    /// `Purge`; later changes do not affect a running countdown.
    pub purge_duration_secs: f32,
    /// Nominal fan period each tick counts down (milliseconds).
    pub dt_ms: u32,

    // -- Outputs --
    /// Remaining purge time (milliseconds). Zero outside `Purge`.
    pub remaining_ms: u32,
    /// Relay command. Re-asserted by every handler on every tick.
    pub relay_on: bool,
}

impl FanContext {
    /// `tick_period_ms` is the nominal fan period.
    pub fn new(tick_period_ms: u32) -> Self {
        Self {
            engine_running: false,
            purge_duration_secs: 600.0,
            dt_ms: tick_period_ms,
            remaining_ms: 0,
            relay_on: false,
        }
    }

    /// Purge duration in whole milliseconds, rounded up. Non-finite or
    /// negative durations read as zero.
    pub fn purge_duration_ms(&self) -> u32 {
        let secs = self.purge_duration_secs;
        if secs.is_finite() && secs > 0.0 {
            (secs * 1000.0).ceil() as u32
        } else {
            0
        }
    }

    /// Remaining purge time in seconds.
    pub fn remaining_secs(&self) -> f32 {
        self.remaining_ms as f32 / 1000.0
    }
}
