//! Fuzz target: `parse_updates`
//!
//! Feeds arbitrary bytes as a `getUpdates` response body.  The parser
//! must never panic, and whatever it accepts must be self-consistent:
//! every returned message id is covered by the reported high-water mark.
//!
//! cargo fuzz run fuzz_telegram_updates

#![no_main]

use libfuzzer_sys::fuzz_target;
use sentinela::adapters::telegram::parse_updates;

fuzz_target!(|data: &[u8]| {
    if let Ok(batch) = parse_updates(data) {
        for msg in &batch.messages {
            let last = batch.last_update_id.expect("messages imply an update id");
            assert!(msg.update_id <= last, "update id beyond high-water mark");
        }
    }
});
