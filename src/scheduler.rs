//! Cooperative fixed-period task scheduler.
//!
//! The main loop calls [`Scheduler::tick`] with the current time; every due
//! task is handed to a [`SchedulerDelegate`] in declaration order, and each
//! runs to completion before the next. Nothing blocks: waiting is only ever
//! "not yet due".
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  Task table (declaration order = execution order)            │
//! │                                                              │
//! │   Rate ─▶ Analog ─▶ Alarms ─▶ Fan ─▶ Telemetry ─▶            │
//! │   AnalogRetry ─▶ Diagnostics                                 │
//! │        │                                                     │
//! │        ▼                                                     │
//! │  ┌────────────────────────────────────────────────────────┐  │
//! │  │       SchedulerDelegate::on_task_due(task, now)        │  │
//! │  └───────────────────────┬────────────────────────────────┘  │
//! │                          ▼                                   │
//! │                  AppService task handlers                    │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! A task that falls a full period or more behind fires once, not once per
//! missed period, and the overrun counter goes up. The rate meter measures
//! its own wall-clock interval and the purge controller bounds its countdown
//! by wall-clock time, so coalescing never stretches a timer by more than
//! one period.

use log::{debug, info};

use crate::app::ports::SchedulerDelegate;
use crate::config::SystemConfig;

// ═══════════════════════════════════════════════════════════════
//  Task identity
// ═══════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskId {
    /// Pulse rate + run-state debounce.
    Rate,
    /// Coolant sender and tank threshold sensors.
    Analog,
    /// Alarm contact majority vote.
    Alarms,
    /// Purge-fan controller.
    Fan,
    /// Telemetry snapshot for the protocol encoders.
    Telemetry,
    /// Analog front-end recovery probe.
    AnalogRetry,
    /// Health report.
    Diagnostics,
}

impl TaskId {
    pub const COUNT: usize = 7;

    /// Execution order within one pass.
    pub const ALL: [Self; Self::COUNT] = [
        Self::Rate,
        Self::Analog,
        Self::Alarms,
        Self::Fan,
        Self::Telemetry,
        Self::AnalogRetry,
        Self::Diagnostics,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Rate => "rate",
            Self::Analog => "analog",
            Self::Alarms => "alarms",
            Self::Fan => "fan",
            Self::Telemetry => "telemetry",
            Self::AnalogRetry => "analog-retry",
            Self::Diagnostics => "diagnostics",
        }
    }

    fn period_ms(self, config: &SystemConfig) -> u32 {
        match self {
            Self::Rate => config.interval_rpm_ms,
            Self::Analog => config.interval_analog_ms,
            Self::Alarms => config.interval_alarm_ms,
            Self::Fan => config.interval_fan_ms,
            Self::Telemetry => config.interval_telemetry_ms,
            Self::AnalogRetry => config.interval_analog_retry_ms,
            Self::Diagnostics => config.interval_diagnostics_ms,
        }
    }
}

// ═══════════════════════════════════════════════════════════════
//  Scheduler engine
// ═══════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy)]
struct TaskSlot {
    id: TaskId,
    period_ms: u32,
    next_due_ms: u32,
}

impl TaskSlot {
    fn is_due(&self, now_ms: u32) -> bool {
        (now_ms.wrapping_sub(self.next_due_ms) as i32) >= 0
    }
}

/// The scheduler engine.
///
/// Decoupled from the service: when a task is due it invokes the
/// [`SchedulerDelegate`] rather than calling into the domain directly,
/// which keeps it independently testable.
pub struct Scheduler {
    tasks: [TaskSlot; TaskId::COUNT],
    overruns: u32,
}

impl Scheduler {
    /// Every task first fires one period after `now_ms`. Zero periods are
    /// treated as 1 ms.
    pub fn new(config: &SystemConfig, now_ms: u32) -> Self {
        let tasks = TaskId::ALL.map(|id| {
            let period_ms = id.period_ms(config).max(1);
            TaskSlot {
                id,
                period_ms,
                next_due_ms: now_ms.wrapping_add(period_ms),
            }
        });
        for t in &tasks {
            info!("scheduler: '{}' every {} ms", t.id.name(), t.period_ms);
        }
        Self { tasks, overruns: 0 }
    }

    /// Run every due task once, in declaration order.
    pub fn tick(&mut self, now_ms: u32, delegate: &mut dyn SchedulerDelegate) {
        for slot in &mut self.tasks {
            if !slot.is_due(now_ms) {
                continue;
            }

            let late = now_ms.wrapping_sub(slot.next_due_ms);
            if late >= slot.period_ms {
                self.overruns = self.overruns.wrapping_add(1);
                debug!("scheduler: '{}' {} ms late, coalesced", slot.id.name(), late);
                slot.next_due_ms = now_ms.wrapping_add(slot.period_ms);
            } else {
                slot.next_due_ms = slot.next_due_ms.wrapping_add(slot.period_ms);
            }

            delegate.on_task_due(slot.id, now_ms);
        }
    }

    /// Milliseconds until the earliest task is due (0 if one already is).
    pub fn ms_until_next(&self, now_ms: u32) -> u32 {
        self.tasks
            .iter()
            .map(|t| {
                if t.is_due(now_ms) {
                    0
                } else {
                    t.next_due_ms.wrapping_sub(now_ms)
                }
            })
            .min()
            .unwrap_or(0)
    }

    /// Times a task fell a full period behind and was coalesced.
    pub fn overruns(&self) -> u32 {
        self.overruns
    }

    pub fn period_ms(&self, task: TaskId) -> u32 {
        self.tasks
            .iter()
            .find(|t| t.id == task)
            .map_or(0, |t| t.period_ms)
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════
