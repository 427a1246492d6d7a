//! `BN256SCALARMUL` (address 0x07). Grounded on
//! `precompiles/bn256ScalarMul.go`'s `bn256MulCaller`: a 64-byte G1 point
//! followed by a 32-byte scalar. The point is structurally-sized random
//! bytes, not an actual curve point.

use crate::filler::Filler;

use super::PrecompileCaller;

pub struct Bn256MulCaller;

impl PrecompileCaller for Bn256MulCaller {
    fn address(&self) -> u8 {
        0x07
    }

    fn synthesize_input(&self, filler: &mut Filler) -> Vec<u8> {
        filler.byte_slice(96)
    }
}
