//! Coolant temperature alert.
//!
//! Sender volts → °C (or not-available) → `Normal` / `Warn` / `Alarm`.
//! A faulted sender is never classified: the last alert level stands, the
//! reading becomes not-available and its freshness is not refreshed, so the
//! published value goes stale on its own.

use log::warn;
use serde::Serialize;

use super::ChangeDetector;
use crate::sensors::coolant_sender::{SenderWindow, volts_to_celsius};
use crate::stale::Freshness;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AlertLevel {
    Normal,
    Warn,
    Alarm,
}

impl AlertLevel {
    /// Thresholds are inclusive: `celsius == alarm_c` is `Alarm`.
    pub fn classify(celsius: f32, warn_c: f32, alarm_c: f32) -> Self {
        if celsius >= alarm_c {
            Self::Alarm
        } else if celsius >= warn_c {
            Self::Warn
        } else {
            Self::Normal
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Warn => "warn",
            Self::Alarm => "alarm",
        }
    }
}

/// Alert level transition with the reading that caused it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoolantAlert {
    pub level: AlertLevel,
    pub celsius: f32,
}

pub struct CoolantMonitor {
    window: SenderWindow,
    celsius: Option<f32>,
    level: ChangeDetector<AlertLevel>,
    freshness: Freshness,
    sender_faulted: bool,
}

impl CoolantMonitor {
    pub fn new(window: SenderWindow, stale_timeout_ms: u32) -> Self {
        Self {
            window,
            celsius: None,
            level: ChangeDetector::new(AlertLevel::Normal),
            freshness: Freshness::new(stale_timeout_ms),
            sender_faulted: false,
        }
    }

    /// Feed one sender voltage. Returns the new alert when the category
    /// changes.
    pub fn update(&mut self, volts: f32, warn_c: f32, alarm_c: f32, now_ms: u32) -> Option<CoolantAlert> {
        let Some(celsius) = volts_to_celsius(volts, self.window) else {
            if !self.sender_faulted {
                warn!("coolant sender fault: {volts:.2} V outside window");
                self.sender_faulted = true;
            }
            self.celsius = None;
            return None;
        };

        self.sender_faulted = false;
        self.celsius = Some(celsius);
        self.freshness.touch(now_ms);

        self.level
            .update(AlertLevel::classify(celsius, warn_c, alarm_c))
            .map(|level| CoolantAlert { level, celsius })
    }

    /// Last reading regardless of age (`None` after a sender fault).
    pub fn celsius(&self) -> Option<f32> {
        self.celsius
    }

    /// Reading for publication: `None` once older than the stale timeout.
    pub fn fresh_celsius(&self, now_ms: u32) -> Option<f32> {
        self.freshness.guard(self.celsius, now_ms)
    }

    pub fn level(&self) -> AlertLevel {
        self.level.get()
    }
}
