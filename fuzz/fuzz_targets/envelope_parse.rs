#![no_main]

//! Fuzz harness for parsing arbitrary, potentially adversarial JSON as
//! a proof envelope: must never panic, only return `Err`.

use libfuzzer_sys::fuzz_target;
use merkle_transparency::envelope::{AuditProofEnvelope, ConsistencyProofEnvelope};

fuzz_target!(|data: &[u8]| {
    let Ok(s) = std::str::from_utf8(data) else { return };
    let _ = AuditProofEnvelope::from_json(s);
    let _ = ConsistencyProofEnvelope::from_json(s);
});
