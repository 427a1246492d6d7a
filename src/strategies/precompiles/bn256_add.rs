//! `BN256ADD` (address 0x06). Grounded on `precompiles/bn256add.go`'s
//! `bn256Caller`: two 64-byte G1 points. No pairing-curve crate is
//! available, so the two points are structurally-sized random bytes rather
//! than points actually on the curve.

use crate::filler::Filler;

use super::PrecompileCaller;

pub struct Bn256AddCaller;

impl PrecompileCaller for Bn256AddCaller {
    fn address(&self) -> u8 {
        0x06
    }

    fn synthesize_input(&self, filler: &mut Filler) -> Vec<u8> {
        filler.byte_slice(128)
    }
}
