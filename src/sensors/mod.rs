//! Sensor subsystem: signal conditioning that turns raw edges and volts into
//! engineering units.
//!
//! - [`pulse_rate`]: ISR-fed edge counter and smoothed RPM.
//! - [`coolant_sender`]: sender voltage → °C with fault window.
//! - [`ads1115`]: the I²C analog front-end driver.

pub mod ads1115;
pub mod coolant_sender;
pub mod pulse_rate;
