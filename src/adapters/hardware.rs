//! Hardware adapter: bridges real peripherals to the domain port traits.
//!
//! Owns the ADS1115, the two alarm contact inputs, the ignition sense
//! input and the purge-fan relay output, and exposes them through
//! [`AnalogPort`], [`DigitalInputPort`] and [`RelayPort`]. Everything is
//! generic over `embedded-hal` 1.0 traits, so the same adapter runs on
//! ESP-IDF drivers and on host mocks.
//!
//! Polarity lives here and nowhere else:
//! - alarm contacts close to ground (active-low, internal pull-up);
//! - ignition sense is active-high;
//! - the relay output follows `relay_active_high`.

use embedded_hal::digital::{InputPin, OutputPin};
use embedded_hal::i2c::I2c;
use log::{info, warn};

use crate::app::ports::{AnalogChannel, AnalogPort, DigitalInputPort, RelayPort};
use crate::classify::alarm::AlarmChannel;
use crate::error::SensorError;
use crate::sensors::ads1115::Ads1115;

/// Concrete adapter that combines all engine-room I/O behind port traits.
pub struct HardwareAdapter<I2C, OIL, TEMP, IGN, RELAY> {
    adc: Ads1115<I2C>,
    oil_pressure: OIL,
    coolant_temp: TEMP,
    ignition: IGN,
    relay: RELAY,
    relay_active_high: bool,
}

impl<I2C, OIL, TEMP, IGN, RELAY> HardwareAdapter<I2C, OIL, TEMP, IGN, RELAY>
where
    I2C: I2c,
    OIL: InputPin,
    TEMP: InputPin,
    IGN: InputPin,
    RELAY: OutputPin,
{
    pub fn new(
        adc: Ads1115<I2C>,
        oil_pressure: OIL,
        coolant_temp: TEMP,
        ignition: IGN,
        relay: RELAY,
        relay_active_high: bool,
    ) -> Self {
        Self {
            adc,
            oil_pressure,
            coolant_temp,
            ignition,
            relay,
            relay_active_high,
        }
    }

    /// Hand the ADC back (tests inspect the mock bus).
    pub fn release_adc(self) -> Ads1115<I2C> {
        self.adc
    }

    fn drive_relay(&mut self, energised: bool) -> Result<(), RELAY::Error> {
        if energised == self.relay_active_high {
            self.relay.set_high()
        } else {
            self.relay.set_low()
        }
    }
}

// ── AnalogPort implementation ─────────────────────────────────

impl<I2C, OIL, TEMP, IGN, RELAY> AnalogPort for HardwareAdapter<I2C, OIL, TEMP, IGN, RELAY>
where
    I2C: I2c,
    OIL: InputPin,
    TEMP: InputPin,
    IGN: InputPin,
    RELAY: OutputPin,
{
    fn read_volts(&mut self, channel: AnalogChannel) -> Result<f32, SensorError> {
        self.adc.read_volts(channel.input())
    }

    fn try_recover(&mut self) -> bool {
        match self.adc.probe() {
            Ok(()) => {
                info!("ADS1115 answering again");
                true
            }
            Err(_) => false,
        }
    }
}

// ── DigitalInputPort implementation ───────────────────────────

impl<I2C, OIL, TEMP, IGN, RELAY> DigitalInputPort for HardwareAdapter<I2C, OIL, TEMP, IGN, RELAY>
where
    I2C: I2c,
    OIL: InputPin,
    TEMP: InputPin,
    IGN: InputPin,
    RELAY: OutputPin,
{
    fn alarm_contact_active(&mut self, channel: AlarmChannel) -> Result<bool, SensorError> {
        match channel {
            AlarmChannel::OilPressure => self
                .oil_pressure
                .is_low()
                .map_err(|_| SensorError::GpioReadFailed),
            AlarmChannel::CoolantTemp => self
                .coolant_temp
                .is_low()
                .map_err(|_| SensorError::GpioReadFailed),
        }
    }

    fn ignition_on(&mut self) -> Result<bool, SensorError> {
        self.ignition.is_high().map_err(|_| SensorError::GpioReadFailed)
    }
}

// ── RelayPort implementation ──────────────────────────────────

impl<I2C, OIL, TEMP, IGN, RELAY> RelayPort for HardwareAdapter<I2C, OIL, TEMP, IGN, RELAY>
where
    I2C: I2c,
    OIL: InputPin,
    TEMP: InputPin,
    IGN: InputPin,
    RELAY: OutputPin,
{
    fn set_relay(&mut self, energised: bool) {
        if self.drive_relay(energised).is_err() {
            warn!("relay write failed (energised={})", energised);
        }
    }
}
