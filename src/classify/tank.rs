//! Discrete tank level from two threshold sensors.
//!
//! Each sensor is a comparator whose output sinks to ground once the level
//! falls below its mounting point. `below_low` wins over `below_mid`, so a
//! contradictory pair (low asserted, mid clear) still reads `Low`.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TankBand {
    Low,
    Mid,
    High,
}

impl TankBand {
    pub fn from_thresholds(below_low: bool, below_mid: bool) -> Self {
        if below_low {
            Self::Low
        } else if below_mid {
            Self::Mid
        } else {
            Self::High
        }
    }

    /// Classify from raw comparator voltages; below `threshold_volts` is
    /// asserted.
    pub fn from_volts(low_sensor_volts: f32, mid_sensor_volts: f32, threshold_volts: f32) -> Self {
        Self::from_thresholds(
            low_sensor_volts < threshold_volts,
            mid_sensor_volts < threshold_volts,
        )
    }

    /// Representative fill percentage: the midpoint of the band.
    pub fn percent(self) -> f32 {
        match self {
            Self::Low => 12.5,
            Self::Mid => 50.0,
            Self::High => 87.5,
        }
    }

    /// Representative volume for a tank of `capacity_l` litres.
    pub fn litres(self, capacity_l: f32) -> f32 {
        capacity_l * self.percent() / 100.0
    }
}
