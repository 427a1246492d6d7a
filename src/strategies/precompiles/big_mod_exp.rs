//! `MODEXP` (address 0x05). Grounded on `precompiles/bigModExp.go`: a header
//! of three 32-byte big-endian lengths (`base_len`, `exp_len`, `mod_len`)
//! followed by that many bytes of each operand.

use ethereum_types::U256;

use crate::filler::Filler;

use super::PrecompileCaller;

pub struct BigModExpCaller;

impl PrecompileCaller for BigModExpCaller {
    fn address(&self) -> u8 {
        0x05
    }

    fn synthesize_input(&self, filler: &mut Filler) -> Vec<u8> {
        let base_len = filler.byte() as usize;
        let exp_len = filler.byte() as usize;
        let mod_len = filler.byte() as usize;

        let mut input = Vec::with_capacity(96 + base_len + exp_len + mod_len);
        input.extend_from_slice(&<[u8; 32]>::from(U256::from(base_len as u64)));
        input.extend_from_slice(&<[u8; 32]>::from(U256::from(exp_len as u64)));
        input.extend_from_slice(&<[u8; 32]>::from(U256::from(mod_len as u64)));
        input.extend(filler.byte_slice(base_len));
        input.extend(filler.byte_slice(exp_len));
        input.extend(filler.byte_slice(mod_len));
        input
    }
}
