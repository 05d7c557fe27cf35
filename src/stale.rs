//! Stale-data guard.
//!
//! A published value must never outlive its source. Every producer stamps
//! the time of its last good update; the publisher asks [`is_stale`] before
//! sending and substitutes "not available" when the answer is yes.
//!
//! For the raw stamp check a stamp of `0` means "never updated" and is
//! always stale. [`Freshness`] keeps "never" apart from the stamp, so an
//! update at exactly `0` ages like any other. Time is a wrapping `u32`
//! millisecond counter, so age is computed with `wrapping_sub`.

/// `true` when the value stamped `last_update_ms` is too old to publish.
pub fn is_stale(last_update_ms: u32, timeout_ms: u32, now_ms: u32) -> bool {
    last_update_ms == 0 || now_ms.wrapping_sub(last_update_ms) > timeout_ms
}

/// Last-good-update stamp for one published value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Freshness {
    /// `None` until the first update and after `invalidate`.
    last_update_ms: Option<u32>,
    timeout_ms: u32,
}

impl Freshness {
    pub const fn new(timeout_ms: u32) -> Self {
        Self {
            last_update_ms: None,
            timeout_ms,
        }
    }

    /// Record a good update at `now_ms`.
    pub fn touch(&mut self, now_ms: u32) {
        self.last_update_ms = Some(now_ms);
    }

    /// Forget the last update (the value is known to be invalid).
    pub fn invalidate(&mut self) {
        self.last_update_ms = None;
    }

    pub fn is_stale(&self, now_ms: u32) -> bool {
        self.last_update_ms
            .is_none_or(|last| now_ms.wrapping_sub(last) > self.timeout_ms)
    }

    /// `Some(value)` while fresh, `None` once stale.
    pub fn guard<T>(&self, value: Option<T>, now_ms: u32) -> Option<T> {
        if self.is_stale(now_ms) { None } else { value }
    }
}
