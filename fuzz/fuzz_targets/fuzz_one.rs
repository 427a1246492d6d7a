#![no_main]
use evmfuzz::{fuzz_one, FuzzConfig};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let cfg = FuzzConfig::default().with_vm_backends(Vec::new());
    let _ = fuzz_one(data, &cfg);
});
