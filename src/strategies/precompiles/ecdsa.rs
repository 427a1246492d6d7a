//! `ECRECOVER` (address 0x01). Grounded on `precompiles/ecdsa.go`: the only
//! precompile caller that signs a real message, since every EVM disagreeing
//! on a genuinely valid recovery is the interesting case.

use k256::ecdsa::signature::hazmat::PrehashSigner;
use k256::ecdsa::{Signature, SigningKey};

use crate::filler::Filler;

use super::PrecompileCaller;

pub struct EcdsaCaller;

impl PrecompileCaller for EcdsaCaller {
    fn address(&self) -> u8 {
        0x01
    }

    fn synthesize_input(&self, filler: &mut Filler) -> Vec<u8> {
        let mut hash = [0u8; 32];
        hash.copy_from_slice(&filler.byte_slice(32));

        let mut key_bytes = [0u8; 32];
        key_bytes.copy_from_slice(&filler.byte_slice(32));
        // A zero scalar isn't a valid signing key; nudge it to one.
        if key_bytes.iter().all(|&b| b == 0) {
            key_bytes[31] = 1;
        }
        let signing_key = match SigningKey::from_bytes((&key_bytes).into()) {
            Ok(k) => k,
            Err(_) => SigningKey::from_bytes((&[1u8; 32]).into()).expect("fixed fallback key is valid"),
        };
        let (sig, recid): (Signature, _) = signing_key
            .sign_prehash_recoverable(&hash)
            .expect("prehash signing over a fixed-length hash cannot fail");

        let mut input = [0u8; 128];
        input[..32].copy_from_slice(&hash);
        input[63] = 27 + recid.to_byte();
        input[64..96].copy_from_slice(&sig.r().to_bytes());
        input[96..128].copy_from_slice(&sig.s().to_bytes());

        input.to_vec()
    }
}
