//! Majority-vote debounce for the digital alarm contacts.
//!
//! ```text
//!   sample ──▶ [b4 b3 b2 b1 b0] ──popcount ≥ M──▶ asserted
//!              └── K-bit history, oldest falls off the top
//! ```
//!
//! Assertion and clearance are delayed symmetrically: a single glitch in
//! either direction cannot flip the output.

use serde::Serialize;

/// Deepest supported history.
pub const MAX_DEPTH: u8 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AlarmChannel {
    OilPressure,
    CoolantTemp,
}

impl AlarmChannel {
    pub const ALL: [Self; 2] = [Self::OilPressure, Self::CoolantTemp];

    pub fn name(self) -> &'static str {
        match self {
            Self::OilPressure => "oil pressure",
            Self::CoolantTemp => "coolant temperature",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct AlarmHistory {
    bits: u8,
    mask: u8,
    threshold: u8,
}

impl AlarmHistory {
    /// `depth` (K) is clamped to `1..=8`, `threshold` (M) to `1..=K`.
    pub fn new(depth: u8, threshold: u8) -> Self {
        let depth = depth.clamp(1, MAX_DEPTH);
        Self {
            bits: 0,
            mask: (((1u16) << depth) - 1) as u8,
            threshold: threshold.clamp(1, depth),
        }
    }

    /// Shift in one raw sample and return the voted state.
    pub fn push(&mut self, sample: bool) -> bool {
        self.bits = ((self.bits << 1) | u8::from(sample)) & self.mask;
        self.is_asserted()
    }

    pub fn is_asserted(&self) -> bool {
        self.bits.count_ones() >= u32::from(self.threshold)
    }

    /// Raw history, newest sample in bit 0.
    pub fn bits(&self) -> u8 {
        self.bits
    }
}
