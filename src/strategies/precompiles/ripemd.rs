//! `RIPEMD160` (address 0x03). Grounded on `precompiles/ripemd.go`:
//! arbitrary random-length input, same shape as the `SHA256` caller.

use crate::filler::Filler;

use super::PrecompileCaller;

pub struct RipemdCaller;

impl PrecompileCaller for RipemdCaller {
    fn address(&self) -> u8 {
        0x03
    }

    fn synthesize_input(&self, filler: &mut Filler) -> Vec<u8> {
        filler.byte_slice_256()
    }
}
