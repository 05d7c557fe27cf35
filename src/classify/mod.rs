//! Threshold classifiers: continuous or noisy inputs → categorical state.
//!
//! | Classifier | Input                         | Output                  |
//! |------------|-------------------------------|-------------------------|
//! | [`coolant`]| sender volts, warn/alarm °C   | `AlertLevel` + °C       |
//! | [`tank`]   | two threshold comparators     | `TankBand` + percent    |
//! | [`alarm`]  | one raw contact sample        | majority-voted assert   |
//!
//! Each one reports changes through a [`ChangeDetector`], so downstream
//! notifications fire on transitions only, never on every tick.

pub mod alarm;
pub mod coolant;
pub mod tank;

/// Remembers the last reported value and reports only changes.
#[derive(Debug, Clone, Copy)]
pub struct ChangeDetector<T> {
    current: T,
}

impl<T: Copy + PartialEq> ChangeDetector<T> {
    pub const fn new(initial: T) -> Self {
        Self { current: initial }
    }

    /// Store `value`; `Some(value)` if it differs from the previous one.
    pub fn update(&mut self, value: T) -> Option<T> {
        if value == self.current {
            return None;
        }
        self.current = value;
        Some(value)
    }

    pub fn get(&self) -> T {
        self.current
    }
}
