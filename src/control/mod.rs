//! Control layer: debounced engine state and the purge-fan controller.

pub mod purge;
pub mod run_state;
