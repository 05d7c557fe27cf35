//! Enginemon firmware library.
//!
//! Exposes the pure-logic modules for integration testing and external
//! inspection. All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod app;
pub mod classify;
pub mod config;
pub mod control;
pub mod diagnostics;
pub mod error;
pub mod fsm;
pub mod scheduler;
pub mod stale;

pub mod pins;

// Adapters and drivers carry cfg-gated ESP-IDF implementations next to
// host simulations, so the crate compiles on both targets.
pub mod adapters;
pub mod drivers;
pub mod sensors;
