//! `IDENTITY` (address 0x04): the data-copy precompile. Arbitrary
//! random-length input; the interesting divergence is in gas accounting for
//! the copy, not the bytes themselves.

use crate::filler::Filler;

use super::PrecompileCaller;

pub struct IdentityCaller;

impl PrecompileCaller for IdentityCaller {
    fn address(&self) -> u8 {
        0x04
    }

    fn synthesize_input(&self, filler: &mut Filler) -> Vec<u8> {
        filler.byte_slice_256()
    }
}
