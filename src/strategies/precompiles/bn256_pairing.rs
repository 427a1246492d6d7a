//! `BN256PAIRING` (address 0x08). Grounded on
//! `precompiles/bn256pairing.go`: a sequence of 192-byte `(G1, G2)` pairs.
//! The source constructs a mathematically valid pairing relation; without a
//! pairing-curve crate in this workspace's dependency stack, this caller
//! only reproduces the input's shape (a random multiple of 192 bytes, 1 to
//! 4 pairs), not a genuine pairing identity.

use crate::filler::Filler;

use super::PrecompileCaller;

pub struct Bn256PairingCaller;

impl PrecompileCaller for Bn256PairingCaller {
    fn address(&self) -> u8 {
        0x08
    }

    fn synthesize_input(&self, filler: &mut Filler) -> Vec<u8> {
        let pairs = 1 + (filler.byte() % 4) as usize;
        filler.byte_slice(pairs * 192)
    }
}
