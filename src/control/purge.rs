//! Purge-fan controller.
//!
//! Owns the fan FSM and its context. One [`tick`](PurgeController::tick)
//! per fan period; [`force_off`](PurgeController::force_off) at any time.
//!
//! The relay is energised if and only if the state is `Purge`. Every state
//! handler re-asserts the relay level on every tick, so the invariant holds
//! after each tick and after each `force_off`, not only at rest.
//!
//! The purge countdown is decremented by the nominal fan period on every
//! tick, so the relay stays on for exactly `ceil(D / T)` ticks however
//! late each tick actually runs. A wall-clock bound of `D + T` from the
//! entering tick backs it up: when the scheduler coalesces fan ticks the
//! purge still ends at most one period late.

use log::{info, warn};

use crate::fsm::context::FanContext;
use crate::fsm::{FanState, Fsm, states};

/// What one tick (or a `force_off`) changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FanStep {
    pub from: FanState,
    pub to: FanState,
    pub relay_on: bool,
    /// Relay output level differs from before the step.
    pub relay_changed: bool,
}

impl FanStep {
    pub fn state_changed(&self) -> bool {
        self.from != self.to
    }
}

/// Wall-clock window of the purge in progress.
#[derive(Debug, Clone, Copy)]
struct PurgeWindow {
    entered_ms: u32,
    limit_ms: u32,
}

pub struct PurgeController {
    fsm: Fsm,
    ctx: FanContext,
    window: Option<PurgeWindow>,
}

impl PurgeController {
    /// `tick_period_ms` is the nominal fan period each tick counts down.
    pub fn new(tick_period_ms: u32) -> Self {
        let mut fsm = Fsm::new(states::build_state_table(), FanState::Idle);
        let mut ctx = FanContext::new(tick_period_ms);
        fsm.start(&mut ctx);
        Self {
            fsm,
            ctx,
            window: None,
        }
    }

    /// Advance one fan period.
    ///
    /// `purge_duration_secs` is the currently configured value; it only
    /// matters on the tick that enters `Purge`. `now_ms` is only used for
    /// the wall-clock bound.
    pub fn tick(&mut self, engine_running: bool, purge_duration_secs: f32, now_ms: u32) -> FanStep {
        self.ctx.engine_running = engine_running;
        self.ctx.purge_duration_secs = purge_duration_secs;

        let from = self.fsm.current_state();
        let was_on = self.ctx.relay_on;
        self.fsm.tick(&mut self.ctx);

        match (from, self.fsm.current_state()) {
            (FanState::Purge, FanState::Purge) => self.enforce_window(now_ms),
            (_, FanState::Purge) => {
                self.window = Some(PurgeWindow {
                    entered_ms: now_ms,
                    limit_ms: self.ctx.remaining_ms.saturating_add(self.ctx.dt_ms),
                });
            }
            _ => self.window = None,
        }

        self.step(from, was_on)
    }

    /// Relay off, state `Idle`, bypassing the transition rules.
    ///
    /// Synchronous: when this returns the relay command is already off.
    /// Calling it again, or while idle, changes nothing.
    pub fn force_off(&mut self) -> FanStep {
        let from = self.fsm.current_state();
        let was_on = self.ctx.relay_on;

        self.fsm.force_transition(FanState::Idle, &mut self.ctx);
        self.ctx.relay_on = false;
        self.ctx.remaining_ms = 0;
        self.window = None;

        let step = self.step(from, was_on);
        if step.state_changed() || step.relay_changed {
            info!("purge fan forced off (was {})", from.name());
        }
        step
    }

    pub fn state(&self) -> FanState {
        self.fsm.current_state()
    }

    pub fn relay_on(&self) -> bool {
        self.ctx.relay_on
    }

    pub fn remaining_secs(&self) -> f32 {
        self.ctx.remaining_secs()
    }

    /// End a purge whose ticks have fallen behind the wall clock.
    fn enforce_window(&mut self, now_ms: u32) {
        let Some(w) = self.window else {
            return;
        };
        let elapsed = now_ms.wrapping_sub(w.entered_ms);
        if elapsed >= w.limit_ms {
            warn!(
                "purge fan ticks fell behind ({} ms since purge start), ending purge",
                elapsed
            );
            self.fsm.force_transition(FanState::Idle, &mut self.ctx);
            self.window = None;
        }
    }

    fn step(&self, from: FanState, was_on: bool) -> FanStep {
        FanStep {
            from,
            to: self.fsm.current_state(),
            relay_on: self.ctx.relay_on,
            relay_changed: self.ctx.relay_on != was_on,
        }
    }
}
