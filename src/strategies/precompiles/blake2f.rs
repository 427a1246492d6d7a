//! `BLAKE2F` (address 0x09). Grounded on `precompiles/blake2f.go`'s fixed
//! 213-byte layout: a 4-byte big-endian round count, 8 64-bit state words,
//! 16 64-bit message words, 2 64-bit offset counters, and a final
//! single-byte final-block flag that is only occasionally coerced to 0 or
//! 1 — the rest of the time it's an arbitrary byte, so implementations'
//! handling of an invalid final-block flag gets exercised too.

use crate::filler::Filler;

use super::PrecompileCaller;

pub struct Blake2fCaller;

impl PrecompileCaller for Blake2fCaller {
    fn address(&self) -> u8 {
        0x09
    }

    fn synthesize_input(&self, filler: &mut Filler) -> Vec<u8> {
        let mut input = Vec::with_capacity(213);
        input.extend_from_slice(&filler.uint32().to_be_bytes()); // rounds
        input.extend(filler.byte_slice(64)); // h
        input.extend(filler.byte_slice(128)); // m
        input.extend(filler.byte_slice(16)); // t0, t1
        input.push(if filler.bool() {
            filler.byte()
        } else if filler.bool() {
            0
        } else {
            1
        }); // final block flag: usually arbitrary, occasionally forced valid
        input
    }
}
