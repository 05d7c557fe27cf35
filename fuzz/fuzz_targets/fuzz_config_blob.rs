//! Fuzz target: persisted config blob
//!
//! Feeds arbitrary bytes through the same postcard decode the NVS store
//! uses and checks:
//! - No panics on truncated or garbage blobs
//! - Any config that decodes and validates re-encodes to a blob that
//!   decodes to the same value
//! - Applying a validated config to the tunables never panics
//!
//! cargo fuzz run fuzz_config_blob

#![no_main]

use enginemon::config::{SystemConfig, Tunables};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(cfg) = postcard::from_bytes::<SystemConfig>(data) else {
        return;
    };
    if cfg.validate().is_err() {
        return;
    }

    let bytes = postcard::to_allocvec(&cfg).expect("encode");
    let again: SystemConfig = postcard::from_bytes(&bytes).expect("decode");
    assert_eq!(again, cfg);

    let tunables = Tunables::default();
    assert!(tunables.apply(&cfg).is_ok());
});
