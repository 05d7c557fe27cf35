//! Fuzz target: purge-fan controller
//!
//! Decodes the input into a sequence of ticks (engine flag, elapsed ms,
//! configured duration) and force-offs, and checks after every step:
//! - No panics, including on NaN / negative / huge durations
//! - The relay is on exactly when the state is `Purge`
//! - `force_off` always leaves the controller idle with the relay off
//!
//! cargo fuzz run fuzz_purge_sequence

#![no_main]

use enginemon::control::purge::PurgeController;
use enginemon::fsm::FanState;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut c = PurgeController::new(1_000);
    let mut now: u32 = 0;

    for chunk in data.chunks_exact(7) {
        let flags = chunk[0];
        let dt = u16::from_le_bytes([chunk[1], chunk[2]]) as u32;
        let duration = f32::from_le_bytes([chunk[3], chunk[4], chunk[5], chunk[6]]);

        if flags & 0x80 != 0 {
            c.force_off();
            assert_eq!(c.state(), FanState::Idle);
            assert!(!c.relay_on());
        } else {
            now = now.wrapping_add(dt);
            c.tick(flags & 1 != 0, duration, now);
        }

        assert_eq!(c.relay_on(), c.state() == FanState::Purge);
    }
});
