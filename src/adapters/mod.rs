//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements        | Connects to                     |
//! |------------|-------------------|---------------------------------|
//! | `hardware` | AnalogPort        | ADS1115 over I2C                |
//! |            | DigitalInputPort  | Alarm contacts, ignition GPIO   |
//! |            | RelayPort         | Purge-fan relay GPIO            |
//! | `log_sink` | EventSink         | Serial log output               |
//! | `nvs`      | ConfigPort        | NVS / in-memory store           |
//! | `time`     | ClockPort         | ESP32 system timer              |

pub mod hardware;
pub mod log_sink;
pub mod nvs;
pub mod time;
