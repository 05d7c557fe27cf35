//! VDO-style NTC coolant temperature sender.
//!
//! The sender is a thermistor to ground: voltage falls as the coolant heats
//! up. Conversion is a piecewise-linear interpolation over a fixed knot
//! table, clamped at both ends. A voltage outside the plausible window
//! means an open or shorted sender and yields `None`, never a number.

/// (volts, °C) knots in strictly descending voltage order.
const CURVE: [(f32, f32); 5] = [
    (3.10, 40.0),
    (2.50, 60.0),
    (1.80, 80.0),
    (1.20, 100.0),
    (0.70, 120.0),
];

/// Sender voltage window. Readings outside it are a wiring fault.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SenderWindow {
    pub min_volts: f32,
    pub max_volts: f32,
}

impl Default for SenderWindow {
    fn default() -> Self {
        Self {
            min_volts: 0.50,
            max_volts: 3.50,
        }
    }
}

/// Convert a sender voltage to °C, or `None` for a faulted sender.
pub fn volts_to_celsius(volts: f32, window: SenderWindow) -> Option<f32> {
    if !volts.is_finite() || volts < window.min_volts || volts > window.max_volts {
        return None;
    }

    let (hot_v, hot_c) = CURVE[CURVE.len() - 1];
    let (cold_v, cold_c) = CURVE[0];
    if volts <= hot_v {
        return Some(hot_c);
    }
    if volts >= cold_v {
        return Some(cold_c);
    }

    CURVE.windows(2).find_map(|pair| {
        let (v_hi, c_lo) = pair[0];
        let (v_lo, c_hi) = pair[1];
        (volts <= v_hi && volts > v_lo).then(|| {
            let ratio = (volts - v_lo) / (v_hi - v_lo);
            c_hi + ratio * (c_lo - c_hi)
        })
    })
}
