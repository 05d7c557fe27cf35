//! Concrete state handler functions and table builder.
//!
//! Each state is three plain `fn` pointers: no closures, no dynamic
//! dispatch, no heap.
//!
//! Every `on_update` writes `relay_on` before returning, in every branch.
//! The relay level is therefore a function of the state the tick ends in,
//! never of what an earlier tick left behind.

use super::context::FanContext;
use super::{FanState, StateDescriptor};
use log::{debug, info};

// ═══════════════════════════════════════════════════════════════════════════
//  Table builder
// ═══════════════════════════════════════════════════════════════════════════

/// Build the static state table. Called once at startup.
pub fn build_state_table() -> [StateDescriptor; FanState::COUNT] {
    [
        // Index 0: Idle
        StateDescriptor {
            name: "Idle",
            on_enter: Some(relay_off),
            on_exit: None,
            on_update: idle_update,
        },
        // Index 1: Running
        StateDescriptor {
            name: "Running",
            on_enter: Some(relay_off),
            on_exit: None,
            on_update: running_update,
        },
        // Index 2: Purge
        StateDescriptor {
            name: "Purge",
            on_enter: Some(purge_enter),
            on_exit: Some(purge_exit),
            on_update: purge_update,
        },
    ]
}

fn relay_off(ctx: &mut FanContext) {
    ctx.relay_on = false;
    ctx.remaining_ms = 0;
}

// ═══════════════════════════════════════════════════════════════════════════
//  IDLE
// ═══════════════════════════════════════════════════════════════════════════

fn idle_update(ctx: &mut FanContext) -> Option<FanState> {
    ctx.relay_on = false;
    ctx.engine_running.then_some(FanState::Running)
}

// ═══════════════════════════════════════════════════════════════════════════
//  RUNNING
// ═══════════════════════════════════════════════════════════════════════════

fn running_update(ctx: &mut FanContext) -> Option<FanState> {
    ctx.relay_on = false;
    if ctx.engine_running {
        return None;
    }
    if ctx.purge_duration_ms() == 0 {
        info!("engine stopped, purge disabled (duration 0)");
        return Some(FanState::Idle);
    }
    Some(FanState::Purge)
}

// ═══════════════════════════════════════════════════════════════════════════
//  PURGE
// ═══════════════════════════════════════════════════════════════════════════

fn purge_enter(ctx: &mut FanContext) {
    ctx.remaining_ms = ctx.purge_duration_ms();
    ctx.relay_on = true;
    info!("purge fan on for {:.0} s", ctx.remaining_secs());
}

fn purge_exit(ctx: &mut FanContext) {
    ctx.relay_on = false;
    ctx.remaining_ms = 0;
}

fn purge_update(ctx: &mut FanContext) -> Option<FanState> {
    if ctx.engine_running {
        ctx.relay_on = false;
        info!("engine restarted, purge aborted");
        return Some(FanState::Running);
    }

    ctx.relay_on = true;
    ctx.remaining_ms = ctx.remaining_ms.saturating_sub(ctx.dt_ms);
    if ctx.remaining_ms == 0 {
        ctx.relay_on = false;
        info!("purge complete");
        return Some(FanState::Idle);
    }

    debug!("purge: {:.0} s remaining", ctx.remaining_secs());
    None
}
