//! ADS1115 16-bit ΔΣ ADC, single-shot mode, over `embedded_hal::i2c::I2c`.
//!
//! Each read writes a config word that starts one conversion on the
//! requested single-ended input, polls the OS (operational status) bit a
//! bounded number of times, then fetches the conversion register. Nothing
//! here sleeps; at 860 SPS a conversion finishes within a few bus
//! round-trips.
//!
//! ```text
//!   CONFIG (0x01) = OS | MUX(AINx/GND) | PGA ±4.096 V | MODE single | DR 860 | COMP off
//!   CONV   (0x00) = i16, 1 LSB = 4.096 V / 32768
//! ```

use embedded_hal::i2c::I2c;

use crate::error::{PeripheralError, SensorError};

const REG_CONVERSION: u8 = 0x00;
const REG_CONFIG: u8 = 0x01;

const OS_START: u16 = 1 << 15;
const MUX_SINGLE_BASE: u16 = 0b100;
const PGA_4V096: u16 = 0b001 << 9;
const MODE_SINGLE_SHOT: u16 = 1 << 8;
const DR_860_SPS: u16 = 0b111 << 5;
const COMP_DISABLE: u16 = 0b11;

const FULL_SCALE_VOLTS: f32 = 4.096;

/// Upper bound on ready polls before a conversion counts as timed out.
pub const MAX_READY_POLLS: u8 = 50;

pub struct Ads1115<I2C> {
    i2c: I2C,
    address: u8,
}

impl<I2C: I2c> Ads1115<I2C> {
    pub fn new(i2c: I2C, address: u8) -> Self {
        Self { i2c, address }
    }

    /// Config word for one single-shot conversion on `channel` (0–3).
    pub const fn config_word(channel: u8) -> u16 {
        OS_START
            | ((MUX_SINGLE_BASE | (channel as u16 & 0b11)) << 12)
            | PGA_4V096
            | MODE_SINGLE_SHOT
            | DR_860_SPS
            | COMP_DISABLE
    }

    /// Check that the chip answers on the bus.
    pub fn probe(&mut self) -> Result<(), PeripheralError> {
        self.read_register(REG_CONFIG).map(|_| ())
    }

    /// Single-ended voltage on `channel`.
    pub fn read_volts(&mut self, channel: u8) -> Result<f32, SensorError> {
        let raw = self.read_raw(channel)?;
        Ok(raw as f32 * FULL_SCALE_VOLTS / 32768.0)
    }

    /// Raw signed conversion result on `channel`.
    pub fn read_raw(&mut self, channel: u8) -> Result<i16, SensorError> {
        self.write_register(REG_CONFIG, Self::config_word(channel))?;

        let mut ready = false;
        for _ in 0..MAX_READY_POLLS {
            if self.read_register(REG_CONFIG)? & OS_START != 0 {
                ready = true;
                break;
            }
        }
        if !ready {
            return Err(SensorError::ConversionTimeout);
        }

        let raw = self.read_register(REG_CONVERSION)?;
        Ok(raw as i16)
    }

    /// Give the bus back (used by tests to inspect the mock).
    pub fn release(self) -> I2C {
        self.i2c
    }

    fn write_register(&mut self, reg: u8, value: u16) -> Result<(), PeripheralError> {
        let [hi, lo] = value.to_be_bytes();
        self.i2c
            .write(self.address, &[reg, hi, lo])
            .map_err(|_| PeripheralError::I2cBus)
    }

    fn read_register(&mut self, reg: u8) -> Result<u16, PeripheralError> {
        let mut buf = [0u8; 2];
        self.i2c
            .write_read(self.address, &[reg], &mut buf)
            .map_err(|_| PeripheralError::I2cBus)?;
        Ok(u16::from_be_bytes(buf))
    }
}
