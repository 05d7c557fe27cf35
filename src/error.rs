//! Error types for the Enginemon firmware.
//!
//! Sensor reads fail with [`SensorError`]; the ADS1115 driver reports bus
//! faults as [`PeripheralError`], which converts into
//! `SensorError::AnalogUnavailable`. All variants are `Copy` so they pass through the
//! service and ports without allocation.

use core::fmt;

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// The analog front-end is offline (bus error, no answer).
    AnalogUnavailable,
    /// The conversion did not complete in time.
    ConversionTimeout,
    /// GPIO read returned an error.
    GpioReadFailed,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AnalogUnavailable => write!(f, "analog front-end unavailable"),
            Self::ConversionTimeout => write!(f, "conversion timed out"),
            Self::GpioReadFailed => write!(f, "GPIO read failed"),
        }
    }
}

// ---------------------------------------------------------------------------
// Peripheral errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeripheralError {
    /// I²C transaction NACKed or failed on the bus.
    I2cBus,
}

impl fmt::Display for PeripheralError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::I2cBus => write!(f, "I2C bus error"),
        }
    }
}

impl From<PeripheralError> for SensorError {
    fn from(_: PeripheralError) -> Self {
        Self::AnalogUnavailable
    }
}
