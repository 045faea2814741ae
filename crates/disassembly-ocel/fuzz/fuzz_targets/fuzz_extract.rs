#![no_main]
use disassembly_ocel::{extract_tables, OcelLog};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Arbitrary JSON must be rejected with an error, never a panic.
    if let Ok(log) = serde_json::from_slice::<OcelLog>(data) {
        let _ = extract_tables(&log);
    }
});
