//! Fuzz target: `PulseDecoder::feed`
//!
//! Interprets the input as little-endian `u32` pulse durations and feeds
//! them to the 433 MHz decoder.  It must never panic and never report a
//! zero code.
//!
//! cargo fuzz run fuzz_rf_decoder

#![no_main]

use libfuzzer_sys::fuzz_target;
use sentinela::drivers::rf_receiver::PulseDecoder;

fuzz_target!(|data: &[u8]| {
    let mut decoder = PulseDecoder::new();
    for chunk in data.chunks_exact(4) {
        let duration = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        if let Some(code) = decoder.feed(duration) {
            assert_ne!(code, 0, "zero is never a valid code");
        }
    }
});
