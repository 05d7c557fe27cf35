//! Engine running/stopped debouncer.
//!
//! The raw "rate above threshold" flag flips the moment the rate crosses
//! the threshold. The debounced flag only follows once the raw flag has
//! held still for the whole debounce window; any flicker inside the window
//! restarts it.

/// Raw and debounced running state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunState {
    pub raw: bool,
    pub debounced: bool,
    /// When `raw` last changed.
    pub since_ms: u32,
}

pub struct RunStateDebouncer {
    state: RunState,
}

impl RunStateDebouncer {
    /// Starts stopped, with the window anchored at `now_ms`.
    pub fn new(now_ms: u32) -> Self {
        Self {
            state: RunState {
                raw: false,
                debounced: false,
                since_ms: now_ms,
            },
        }
    }

    /// Feed one raw sample. Returns the debounced state.
    pub fn update(&mut self, raw_above_threshold: bool, debounce_ms: u32, now_ms: u32) -> bool {
        let s = &mut self.state;
        if raw_above_threshold != s.raw {
            s.raw = raw_above_threshold;
            s.since_ms = now_ms;
        }
        if now_ms.wrapping_sub(s.since_ms) >= debounce_ms {
            s.debounced = s.raw;
        }
        s.debounced
    }

    /// Compare `rate` against `threshold` and debounce the result.
    pub fn update_rate(&mut self, rate: f32, threshold: f32, debounce_ms: u32, now_ms: u32) -> bool {
        self.update(rate > threshold, debounce_ms, now_ms)
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state.debounced
    }
}
