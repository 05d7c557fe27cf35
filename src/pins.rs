//! GPIO / peripheral pin assignments for the HALMET board.
//!
//! Single source of truth: every driver references this module rather than
//! hard-coding pin numbers.

// ---------------------------------------------------------------------------
// Digital inputs (opto-isolated D1–D4)
// ---------------------------------------------------------------------------

/// D1: alternator W-terminal pulse train, falling-edge interrupt.
pub const ENGINE_RPM_GPIO: i32 = 23;
/// D2: oil-pressure switch. Active LOW (contact closed = alarm).
pub const OIL_PRESSURE_GPIO: i32 = 25;
/// D3: coolant over-temperature switch. Active LOW.
pub const COOLANT_TEMP_SWITCH_GPIO: i32 = 27;
/// D4: ignition sense. Active HIGH.
pub const IGNITION_GPIO: i32 = 26;

// ---------------------------------------------------------------------------
// Outputs
// ---------------------------------------------------------------------------

/// Purge-fan relay driver.
pub const FAN_RELAY_GPIO: i32 = 32;

// ---------------------------------------------------------------------------
// I²C bus (ADS1115 analog front-end)
// ---------------------------------------------------------------------------

pub const I2C_SDA_GPIO: i32 = 21;
pub const I2C_SCL_GPIO: i32 = 22;
/// ADS1115 with ADDR strapped to SCL.
pub const ADS1115_ADDR: u8 = 0x4B;
/// 400 kHz fast mode.
pub const I2C_BAUD_HZ: u32 = 400_000;
