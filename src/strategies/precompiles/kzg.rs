//! `KZG_POINT_EVALUATION` (address 0x0a). Fixed 192-byte input: a 32-byte
//! versioned hash, 32-byte evaluation point, 32-byte claimed value, 48-byte
//! commitment and 48-byte proof. No KZG/pairing crate is in this
//! workspace's dependency stack, so the payload is structurally-sized
//! random bytes rather than a commitment that actually opens to the claim.

use crate::filler::Filler;

use super::PrecompileCaller;

pub struct KzgCaller;

impl PrecompileCaller for KzgCaller {
    fn address(&self) -> u8 {
        0x0a
    }

    fn synthesize_input(&self, filler: &mut Filler) -> Vec<u8> {
        filler.byte_slice(192)
    }
}
