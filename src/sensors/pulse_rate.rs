//! Alternator W-terminal pulse-rate meter (engine RPM).
//!
//! ```text
//!   GPIO ISR (falling edge)            scheduler (100 ms)
//!   ──────────────────────             ──────────────────
//!   EdgeCounter::record_edge  ──▶  count / last_edge  ──▶  PulseRateMeter::tick
//!     fetch_add + store                 swap(0) under          instantaneous rate
//!                                      critical section       → ring buffer → mean
//! ```
//!
//! The ISR does the minimum possible work: one atomic increment and one
//! timestamp store. The scheduler side snapshots both fields and zeroes the
//! count inside a short critical section so no edge is lost or counted
//! twice.
//!
//! Stall detection uses the edge timestamp, not the tick count: once a tick
//! sees no new edges and the last one is more than [`STALL_TIMEOUT_MS`] old,
//! the rate reads zero and the smoothing history is discarded.

use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use crate::config::MAX_RPM_SMOOTHING_SAMPLES;

/// No edge for longer than this means the signal source is gone.
pub const STALL_TIMEOUT_MS: u32 = 2000;

// ── ISR-shared edge counter ───────────────────────────────────

/// Edge count plus timestamp of the most recent edge.
///
/// Written only from interrupt context via [`record_edge`](Self::record_edge);
/// read and cleared only by [`PulseRateMeter`].
#[derive(Debug)]
pub struct EdgeCounter {
    count: AtomicU32,
    last_edge_ms: AtomicU32,
    seen: AtomicBool,
}

impl EdgeCounter {
    pub const fn new() -> Self {
        Self {
            count: AtomicU32::new(0),
            last_edge_ms: AtomicU32::new(0),
            seen: AtomicBool::new(false),
        }
    }

    /// ISR entry point. Lock-free, allocation-free.
    #[inline]
    pub fn record_edge(&self, now_ms: u32) {
        self.count.fetch_add(1, Ordering::Relaxed);
        self.last_edge_ms.store(now_ms, Ordering::Relaxed);
        self.seen.store(true, Ordering::Release);
    }

    /// Snapshot-and-clear: edges since the previous call and the last edge
    /// time (`None` until the first edge ever).
    fn take(&self) -> (u32, Option<u32>) {
        critical_section::with(|_| {
            let edges = self.count.swap(0, Ordering::Relaxed);
            let last = self
                .seen
                .load(Ordering::Acquire)
                .then(|| self.last_edge_ms.load(Ordering::Relaxed));
            (edges, last)
        })
    }
}

impl Default for EdgeCounter {
    fn default() -> Self {
        Self::new()
    }
}

/// W-terminal edge counter fed by the D1 interrupt.
/// `static` because ESP-IDF ISR callbacks cannot capture state.
pub static ENGINE_EDGES: EdgeCounter = EdgeCounter::new();

// ── Rate meter ────────────────────────────────────────────────

/// Smoothed rate in revolutions per minute.
pub struct PulseRateMeter {
    edges: &'static EdgeCounter,
    ring: [f32; MAX_RPM_SMOOTHING_SAMPLES],
    head: usize,
    count: usize,
    window: usize,
    rate: f32,
    last_update_ms: u32,
}

impl PulseRateMeter {
    /// `window` is clamped to `1..=20` samples.
    pub fn new(edges: &'static EdgeCounter, window: u8, now_ms: u32) -> Self {
        Self {
            edges,
            ring: [0.0; MAX_RPM_SMOOTHING_SAMPLES],
            head: 0,
            count: 0,
            window: (window as usize).clamp(1, MAX_RPM_SMOOTHING_SAMPLES),
            rate: 0.0,
            last_update_ms: now_ms,
        }
    }

    /// Tick using the wall-clock time elapsed since the previous update.
    pub fn update(&mut self, now_ms: u32, pulses_per_unit: f32) -> f32 {
        let elapsed = now_ms.wrapping_sub(self.last_update_ms);
        self.tick(elapsed, now_ms, pulses_per_unit)
    }

    /// Consume the edges counted over the last `elapsed_ms` and return the
    /// smoothed rate.
    ///
    /// A zero-length interval returns the previous rate untouched and leaves
    /// the edge count for the next tick.
    pub fn tick(&mut self, elapsed_ms: u32, now_ms: u32, pulses_per_unit: f32) -> f32 {
        if elapsed_ms == 0 {
            return self.rate;
        }
        self.last_update_ms = now_ms;

        let (edges, last_edge) = self.edges.take();

        if pulses_per_unit.is_finite() && pulses_per_unit > 0.0 {
            let per_sec = edges as f32 * 1000.0 / elapsed_ms as f32;
            self.push(per_sec / pulses_per_unit * 60.0);
            self.rate = self.mean();
        } else {
            log::warn!("pulse_rate: ignoring invalid pulses-per-unit {pulses_per_unit}");
        }

        // The ISR stamps edges from its own clock read, so the last edge may
        // be a millisecond or two ahead of `now_ms`. Signed age keeps that
        // from looking like an ancient edge.
        let stalled = edges == 0
            && last_edge.is_none_or(|t| now_ms.wrapping_sub(t) as i32 > STALL_TIMEOUT_MS as i32);
        if stalled {
            self.reset();
        }

        self.rate
    }

    /// Last computed rate.
    pub fn rate(&self) -> f32 {
        self.rate
    }

    /// Number of valid samples in the smoothing window.
    pub fn samples(&self) -> usize {
        self.count
    }

    fn push(&mut self, sample: f32) {
        self.ring[self.head] = sample;
        self.head = (self.head + 1) % self.window;
        if self.count < self.window {
            self.count += 1;
        }
    }

    fn mean(&self) -> f32 {
        if self.count == 0 {
            return 0.0;
        }
        let sum: f32 = self.ring[..self.count].iter().sum();
        sum / self.count as f32
    }

    fn reset(&mut self) {
        self.ring = [0.0; MAX_RPM_SMOOTHING_SAMPLES];
        self.head = 0;
        self.count = 0;
        self.rate = 0.0;
    }
}
