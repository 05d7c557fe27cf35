//! Enginemon Firmware: Main Entry Point
//!
//! Hexagonal architecture driven by a cooperative fixed-period scheduler.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter        LogEventSink   NvsConfigStore  Esp32Time│
//! │  (Analog+Digital+Relay) (EventSink)    (ConfigPort)    (Clock) │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              AppService (pure logic)                   │    │
//! │  │  rate · run state · purge FSM · classifiers            │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  Scheduler (delegate-driven) · W-terminal ISR (EdgeCounter)    │
//! └────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use anyhow::Result;
use esp_idf_hal::delay::FreeRtos;
use esp_idf_hal::gpio::{PinDriver, Pull};
use esp_idf_hal::i2c::{I2cConfig, I2cDriver};
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_hal::units::Hertz;
use log::{error, info, warn};

use enginemon::adapters::hardware::HardwareAdapter;
use enginemon::adapters::log_sink::LogEventSink;
use enginemon::adapters::nvs::NvsConfigStore;
use enginemon::adapters::time::Esp32TimeAdapter;
use enginemon::app::ports::ClockPort;
use enginemon::app::service::{AppService, TaskRunner};
use enginemon::config::{SystemConfig, Tunables};
use enginemon::diagnostics::{self, ResetReason};
use enginemon::drivers::hw_init;
use enginemon::pins;
use enginemon::scheduler::Scheduler;
use enginemon::sensors::ads1115::Ads1115;
use enginemon::sensors::pulse_rate::ENGINE_EDGES;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;
    diagnostics::install_panic_handler();

    info!("Enginemon v{}", diagnostics::FIRMWARE_VERSION);
    let reset = ResetReason::current();
    if reset.is_fault() {
        warn!("restarted after fault: {:?}", reset);
    } else {
        info!("reset reason: {:?}", reset);
    }

    // ── 2. Config + runtime tunables ──────────────────────────
    let tunables = Arc::new(Tunables::default());
    let config = match NvsConfigStore::new(Arc::clone(&tunables)) {
        Ok(store) => store.load_and_apply(),
        Err(e) => {
            error!("NVS init failed ({}), running with defaults", e);
            SystemConfig::default()
        }
    };

    // ── 3. Peripherals ────────────────────────────────────────
    let p = Peripherals::take()?;

    let i2c_cfg = I2cConfig::new().baudrate(Hertz(pins::I2C_BAUD_HZ));
    let i2c = I2cDriver::new(p.i2c0, p.pins.gpio21, p.pins.gpio22, &i2c_cfg)?;
    let adc = Ads1115::new(i2c, pins::ADS1115_ADDR);

    let mut oil = PinDriver::input(p.pins.gpio25)?;
    oil.set_pull(Pull::Up)?;
    let mut coolant_switch = PinDriver::input(p.pins.gpio27)?;
    coolant_switch.set_pull(Pull::Up)?;
    let ignition = PinDriver::input(p.pins.gpio26)?;
    let relay = PinDriver::output(p.pins.gpio32)?;

    let mut hw = HardwareAdapter::new(
        adc,
        oil,
        coolant_switch,
        ignition,
        relay,
        config.relay_active_high,
    );

    hw_init::init_peripherals()?;
    if let Err(e) = hw_init::init_isr_service() {
        error!("ISR service init failed: {}, engine rate unavailable", e);
    }

    // ── 4. Application core ───────────────────────────────────
    let clock = Esp32TimeAdapter::new();
    let mut sink = LogEventSink::new();
    let now = clock.now_ms();

    let mut app = AppService::new(config.clone(), tunables, &ENGINE_EDGES, now);
    app.start(&mut hw, &mut sink);
    let mut sched = Scheduler::new(&config, now);

    info!("Entering scheduler loop");

    // ── 5. Scheduler loop ─────────────────────────────────────
    loop {
        let now = clock.now_ms();
        let overruns = sched.overruns();
        let mut runner = TaskRunner {
            app: &mut app,
            hw: &mut hw,
            sink: &mut sink,
            scheduler_overruns: overruns,
        };
        sched.tick(now, &mut runner);

        let wait = sched.ms_until_next(clock.now_ms()).max(1);
        FreeRtos::delay_ms(wait);
    }
}
