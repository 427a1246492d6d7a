//! BLS12-381 precompiles (addresses 0x0b-0x11, EIP-2537). Consolidated into
//! one file since all seven share the same shape: a fixed or
//! fixed-multiple-length byte string with no validity checks this crate can
//! perform without a pairing-curve dependency, which isn't present anywhere
//! in this workspace's corpus. Every caller here produces correctly-sized
//! but not necessarily on-curve payloads.

use crate::filler::Filler;

use super::PrecompileCaller;

pub struct G1AddCaller;

impl PrecompileCaller for G1AddCaller {
    fn address(&self) -> u8 {
        0x0b
    }
    fn synthesize_input(&self, filler: &mut Filler) -> Vec<u8> {
        filler.byte_slice(256) // two 128-byte G1 points
    }
}

pub struct G1MsmCaller;

impl PrecompileCaller for G1MsmCaller {
    fn address(&self) -> u8 {
        0x0c
    }
    fn synthesize_input(&self, filler: &mut Filler) -> Vec<u8> {
        let pairs = 1 + (filler.byte() % 4) as usize;
        filler.byte_slice(pairs * 160) // 128-byte point + 32-byte scalar
    }
}

pub struct G2AddCaller;

impl PrecompileCaller for G2AddCaller {
    fn address(&self) -> u8 {
        0x0d
    }
    fn synthesize_input(&self, filler: &mut Filler) -> Vec<u8> {
        filler.byte_slice(512) // two 256-byte G2 points
    }
}

pub struct G2MsmCaller;

impl PrecompileCaller for G2MsmCaller {
    fn address(&self) -> u8 {
        0x0e
    }
    fn synthesize_input(&self, filler: &mut Filler) -> Vec<u8> {
        let pairs = 1 + (filler.byte() % 4) as usize;
        filler.byte_slice(pairs * 288) // 256-byte point + 32-byte scalar
    }
}

pub struct PairingCaller;

impl PrecompileCaller for PairingCaller {
    fn address(&self) -> u8 {
        0x0f
    }
    fn synthesize_input(&self, filler: &mut Filler) -> Vec<u8> {
        let pairs = 1 + (filler.byte() % 4) as usize;
        filler.byte_slice(pairs * 384) // 128-byte G1 + 256-byte G2
    }
}

pub struct MapFpToG1Caller;

impl PrecompileCaller for MapFpToG1Caller {
    fn address(&self) -> u8 {
        0x10
    }
    fn synthesize_input(&self, filler: &mut Filler) -> Vec<u8> {
        filler.byte_slice(64) // one Fp element
    }
}

pub struct MapFp2ToG2Caller;

impl PrecompileCaller for MapFp2ToG2Caller {
    fn address(&self) -> u8 {
        0x11
    }
    fn synthesize_input(&self, filler: &mut Filler) -> Vec<u8> {
        filler.byte_slice(128) // one Fp2 element
    }
}
