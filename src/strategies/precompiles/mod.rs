//! Precompile input synthesizers and the randomized-call dispatcher.
//!
//! Grounded on `generator/precompiles/precompiles.go`'s registry array,
//! `CallObj`, and the `CallRandomizer`/`CallPrecompile` entry points.

pub mod big_mod_exp;
pub mod blake2f;
pub mod bls12381;
pub mod bn256_add;
pub mod bn256_mul;
pub mod bn256_pairing;
pub mod ecdsa;
pub mod identity;
pub mod kzg;
pub mod ripemd;
pub mod sha256;

use ethereum_types::U256;

use crate::assembler::Call;
use crate::filler::Filler;
use crate::opcode::OpCode;

use super::Environment;

/// Parameters for an arbitrary call, as drawn by
/// [`super::call::RandomCallGenerator`].
pub struct CallParams {
    pub gas: U256,
    pub address: U256,
    pub value: U256,
    pub in_offset: usize,
    pub in_size: usize,
    pub out_offset: usize,
    pub out_size: usize,
}

/// Lays a precompile's input into memory at offset 0 and reports its
/// length. Addresses that need real cryptography (ECDSA recovery) produce a
/// genuinely valid input; the pairing-curve precompiles produce
/// structurally-sized payloads only, since no pairing-curve arithmetic is
/// available to this crate.
pub trait PrecompileCaller: Send + Sync {
    fn address(&self) -> u8;

    /// Synthesizes this precompile's raw input bytes straight from `filler`,
    /// with no dependency on a `Program`. Grounded on
    /// `cmd/precompileBench`'s `make*` functions, which build the exact same
    /// input layouts outside of any fuzzing-strategy call site for
    /// benchmarking; exposed here as a public API so a downstream
    /// benchmark harness can reuse the layout logic without a `Program` or
    /// `Environment` in hand.
    fn synthesize_input(&self, filler: &mut Filler) -> Vec<u8>;

    /// Lays this precompile's input into program memory at offset 0 and
    /// reports its length.
    fn write_input(&self, env: &mut Environment) -> usize {
        let input = self.synthesize_input(env.filler);
        env.program.mstore_bytes(&input, 0);
        input.len()
    }
}

pub fn registry() -> Vec<Box<dyn PrecompileCaller>> {
    vec![
        Box::new(ecdsa::EcdsaCaller),
        Box::new(sha256::Sha256Caller),
        Box::new(ripemd::RipemdCaller),
        Box::new(identity::IdentityCaller),
        Box::new(big_mod_exp::BigModExpCaller),
        Box::new(bn256_add::Bn256AddCaller),
        Box::new(bn256_mul::Bn256MulCaller),
        Box::new(bn256_pairing::Bn256PairingCaller),
        Box::new(blake2f::Blake2fCaller),
        Box::new(kzg::KzgCaller),
        Box::new(bls12381::G1AddCaller),
        Box::new(bls12381::G1MsmCaller),
        Box::new(bls12381::G2AddCaller),
        Box::new(bls12381::G2MsmCaller),
        Box::new(bls12381::PairingCaller),
        Box::new(bls12381::MapFpToG1Caller),
        Box::new(bls12381::MapFp2ToG2Caller),
    ]
}

fn emit_call(env: &mut Environment, op: OpCode, params: CallParams) {
    let call = match op {
        OpCode::CALLCODE => Call::call_code(params.address),
        OpCode::STATICCALL => Call::static_call(params.address),
        OpCode::DELEGATECALL => Call::delegate_call(params.address),
        _ => Call::call(params.address),
    }
    .gas(params.gas)
    .value(params.value)
    .input(U256::from(params.in_offset as u64), U256::from(params.in_size as u64))
    .output(U256::from(params.out_offset as u64), U256::from(params.out_size as u64));
    env.program.call(call);
}

/// Mirrors `CallRandomizer`: about 1 in 25 draws replaces the drawn gas
/// figure with a freshly-drawn one to occasionally probe out-of-gas
/// boundaries right at the call site, then dispatches through one of
/// `CALL`/`CALLCODE`/`STATICCALL`.
pub fn call_randomizer(env: &mut Environment, mut params: CallParams) {
    if env.filler.byte() % 25 == 0 {
        params.gas = env.filler.gas_int();
    }
    let op = match env.filler.byte() % 3 {
        0 => OpCode::CALL,
        1 => OpCode::CALLCODE,
        _ => OpCode::STATICCALL,
    };
    emit_call(env, op, params);
}

/// Picks a registered precompile, has it lay its own input into memory,
/// then calls its fixed address through a randomly chosen call opcode.
pub fn call_precompile(env: &mut Environment) {
    let callers = registry();
    let idx = (env.filler.byte() as usize) % callers.len();
    let in_size = callers[idx].write_input(env);
    let params = CallParams {
        gas: env.filler.gas_int(),
        address: U256::from(callers[idx].address()),
        value: U256::zero(),
        in_offset: 0,
        in_size,
        out_offset: 0,
        out_size: 256,
    };
    let op = match env.filler.byte() % 3 {
        0 => OpCode::CALL,
        1 => OpCode::STATICCALL,
        _ => OpCode::DELEGATECALL,
    };
    emit_call(env, op, params);
}
