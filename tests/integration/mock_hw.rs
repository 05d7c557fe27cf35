//! Mock hardware for integration tests.
//!
//! `MockHw` implements the domain ports directly and records every relay
//! write. `MockAds1115` and `MockPin` sit one layer lower: they implement
//! the `embedded-hal` traits so the real `HardwareAdapter` and ADS1115
//! driver can be exercised without a board.

use std::cell::Cell;
use std::convert::Infallible;
use std::rc::Rc;
use std::sync::Arc;

use embedded_hal::digital::{ErrorType as PinErrorType, InputPin, OutputPin};
use embedded_hal::i2c::{ErrorKind, ErrorType, I2c, NoAcknowledgeSource, Operation};

use enginemon::app::events::{AppEvent, TelemetryData};
use enginemon::app::ports::{
    AnalogChannel, AnalogPort, DigitalInputPort, EventSink, RelayPort,
};
use enginemon::app::service::{AppService, TaskRunner};
use enginemon::classify::alarm::AlarmChannel;
use enginemon::config::{SystemConfig, Tunables};
use enginemon::error::SensorError;
use enginemon::scheduler::Scheduler;
use enginemon::sensors::pulse_rate::EdgeCounter;

// ── Port-level mock ───────────────────────────────────────────

pub struct MockHw {
    /// Coolant sender, tank-mid, tank-low volts.
    pub volts: [f32; 3],
    /// Every analog read fails while set.
    pub analog_down: bool,
    /// What `try_recover` answers.
    pub recover_ok: bool,
    pub contacts: [bool; 2],
    pub ignition: bool,
    pub relay_writes: Vec<bool>,
}

#[allow(dead_code)]
impl MockHw {
    pub fn new() -> Self {
        Self {
            volts: [2.50, 3.00, 3.00],
            analog_down: false,
            recover_ok: true,
            contacts: [false, false],
            ignition: true,
            relay_writes: Vec::new(),
        }
    }

    pub fn set_volts(&mut self, channel: AnalogChannel, volts: f32) {
        self.volts[channel.input() as usize] = volts;
    }

    pub fn set_contact(&mut self, channel: AlarmChannel, active: bool) {
        self.contacts[channel as usize] = active;
    }

    pub fn relay(&self) -> bool {
        self.relay_writes.last().copied().unwrap_or(false)
    }

    pub fn relay_on_writes(&self) -> usize {
        self.relay_writes.iter().filter(|&&on| on).count()
    }
}

impl AnalogPort for MockHw {
    fn read_volts(&mut self, channel: AnalogChannel) -> Result<f32, SensorError> {
        if self.analog_down {
            return Err(SensorError::AnalogUnavailable);
        }
        Ok(self.volts[channel.input() as usize])
    }

    fn try_recover(&mut self) -> bool {
        if self.recover_ok {
            self.analog_down = false;
        }
        self.recover_ok
    }
}

impl DigitalInputPort for MockHw {
    fn alarm_contact_active(&mut self, channel: AlarmChannel) -> Result<bool, SensorError> {
        Ok(self.contacts[channel as usize])
    }

    fn ignition_on(&mut self) -> Result<bool, SensorError> {
        Ok(self.ignition)
    }
}

impl RelayPort for MockHw {
    fn set_relay(&mut self, energised: bool) {
        self.relay_writes.push(energised);
    }
}

// ── Recording sink ────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }

    pub fn last_telemetry(&self) -> Option<&TelemetryData> {
        self.events.iter().rev().find_map(|e| match e {
            AppEvent::Telemetry(t) => Some(t),
            _ => None,
        })
    }

    pub fn relay_events(&self) -> Vec<&AppEvent> {
        self.events
            .iter()
            .filter(|e| matches!(e, AppEvent::RelayChanged { .. }))
            .collect()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

// ── Simulation rig ────────────────────────────────────────────

/// Scheduler + service + mocks on a simulated 100 ms clock.
pub struct Rig {
    pub app: AppService,
    pub sched: Scheduler,
    pub hw: MockHw,
    pub sink: RecordingSink,
    pub tunables: Arc<Tunables>,
    pub edges: &'static EdgeCounter,
    pub now: u32,
}

#[allow(dead_code)]
impl Rig {
    pub const STEP_MS: u32 = 100;

    pub fn new(edges: &'static EdgeCounter) -> Self {
        Self::with_config(edges, SystemConfig::default())
    }

    pub fn with_config(edges: &'static EdgeCounter, config: SystemConfig) -> Self {
        let tunables = Arc::new(Tunables::from_config(&config));
        let mut app = AppService::new(config.clone(), Arc::clone(&tunables), edges, 0);
        let mut hw = MockHw::new();
        let mut sink = RecordingSink::default();
        app.start(&mut hw, &mut sink);
        Self {
            app,
            sched: Scheduler::new(&config, 0),
            hw,
            sink,
            tunables,
            edges,
            now: 0,
        }
    }

    /// Advance to `until_ms`, recording `edges_per_step` W-terminal edges
    /// before each 100 ms scheduler pass.
    pub fn run(&mut self, until_ms: u32, edges_per_step: u32) {
        while self.now < until_ms {
            self.now += Self::STEP_MS;
            for _ in 0..edges_per_step {
                self.edges.record_edge(self.now);
            }
            let overruns = self.sched.overruns();
            let mut runner = TaskRunner {
                app: &mut self.app,
                hw: &mut self.hw,
                sink: &mut self.sink,
                scheduler_overruns: overruns,
            };
            self.sched.tick(self.now, &mut runner);
        }
    }
}

// ── embedded-hal level mocks ──────────────────────────────────

/// Emulates the ADS1115 register file: a config write selects the input
/// and latches that input's raw code into the conversion register.
pub struct MockAds1115 {
    pub present: Rc<Cell<bool>>,
    /// Conversion never finishes while set.
    pub stuck_busy: bool,
    pub raw: [i16; 4],
    pub last_config: Option<u16>,
    pointer: u8,
    config: u16,
    conversion: i16,
}

#[allow(dead_code)]
impl MockAds1115 {
    pub fn new(raw: [i16; 4]) -> Self {
        Self {
            present: Rc::new(Cell::new(true)),
            stuck_busy: false,
            raw,
            last_config: None,
            pointer: 0,
            config: 0x8583,
            conversion: 0,
        }
    }

    fn read_pointer(&self) -> [u8; 2] {
        match self.pointer {
            0x00 => self.conversion.to_be_bytes(),
            _ => {
                let os = if self.stuck_busy { 0 } else { 0x8000 };
                ((self.config & 0x7FFF) | os).to_be_bytes()
            }
        }
    }
}

impl ErrorType for MockAds1115 {
    type Error = ErrorKind;
}

impl I2c for MockAds1115 {
    fn transaction(
        &mut self,
        _address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        if !self.present.get() {
            return Err(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address));
        }
        for op in operations {
            match op {
                Operation::Write(bytes) => {
                    if let Some((&reg, rest)) = bytes.split_first() {
                        self.pointer = reg;
                        if reg == 0x01 && rest.len() == 2 {
                            let word = u16::from_be_bytes([rest[0], rest[1]]);
                            self.config = word;
                            self.last_config = Some(word);
                            let channel = ((word >> 12) & 0b11) as usize;
                            self.conversion = self.raw[channel];
                        }
                    }
                }
                Operation::Read(buf) => {
                    let bytes = self.read_pointer();
                    for (dst, src) in buf.iter_mut().zip(bytes) {
                        *dst = src;
                    }
                }
            }
        }
        Ok(())
    }
}

/// A GPIO whose level is shared with the test through an `Rc<Cell>`.
#[derive(Clone)]
pub struct MockPin {
    pub level: Rc<Cell<bool>>,
}

#[allow(dead_code)]
impl MockPin {
    pub fn new(high: bool) -> Self {
        Self {
            level: Rc::new(Cell::new(high)),
        }
    }
}

impl PinErrorType for MockPin {
    type Error = Infallible;
}

impl InputPin for MockPin {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.level.get())
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.level.get())
    }
}

impl OutputPin for MockPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.level.set(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.level.set(true);
        Ok(())
    }
}

/// Input pin whose reads always fail. Its error type differs from
/// [`MockPin`]'s, so an adapter can mix both on its input channels.
pub struct FaultyPin;

impl PinErrorType for FaultyPin {
    type Error = embedded_hal::digital::ErrorKind;
}

impl InputPin for FaultyPin {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Err(embedded_hal::digital::ErrorKind::Other)
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Err(embedded_hal::digital::ErrorKind::Other)
    }
}
