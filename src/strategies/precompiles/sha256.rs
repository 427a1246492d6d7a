//! `SHA256` (address 0x02). Grounded on `precompiles/sha256.go`: arbitrary
//! random-length input, since the hash has no structural constraints.

use crate::filler::Filler;

use super::PrecompileCaller;

pub struct Sha256Caller;

impl PrecompileCaller for Sha256Caller {
    fn address(&self) -> u8 {
        0x02
    }

    fn synthesize_input(&self, filler: &mut Filler) -> Vec<u8> {
        filler.byte_slice_256()
    }
}
