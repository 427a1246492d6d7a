//! Opcode-, memory- and storage-oriented strategies.
//!
//! Grounded on `generator/basic_strategies.go`'s `basicStrategies` list:
//! each generator there becomes one `Strategy` here with the same
//! `Importance` weight.

use ethereum_types::U256;

use crate::opcode::OpCode;

use super::{clamp_usize, Environment, Strategy};

pub fn register(out: &mut Vec<Box<dyn Strategy>>) {
    out.push(Box::new(OpcodeGenerator));
    out.push(Box::new(MemStorageGenerator));
    out.push(Box::new(MstoreGenerator));
    out.push(Box::new(SstoreGenerator));
    out.push(Box::new(TstoreGenerator));
    out.push(Box::new(ReturnDataGenerator));
    out.push(Box::new(ReturnGenerator));
    out.push(Box::new(PushGenerator));
    out.push(Box::new(HashAndStoreGenerator));
    out.push(Box::new(MloadGenerator));
    out.push(Box::new(SloadGenerator));
    out.push(Box::new(TloadGenerator));
    out.push(Box::new(BlobhashGenerator));
}

/// Emits one raw opcode byte, whether or not it decodes to a named opcode.
/// `BLOCKHASH` is skipped: reference clients disagree on the blockhash
/// oracle they use inside state tests, so including it would manufacture
/// divergences that aren't implementation bugs. Undefined bytes are not
/// skipped — implementations disagreeing on invalid-opcode handling is
/// exactly the kind of divergence this fuzzer exists to find.
struct OpcodeGenerator;

impl Strategy for OpcodeGenerator {
    fn execute(&self, env: &mut Environment) {
        let b = env.filler.byte();
        if b != OpCode::BLOCKHASH.to_u8() {
            env.program.op_byte(b);
        }
    }
    fn importance(&self) -> u8 {
        10
    }
    fn name(&self) -> &'static str {
        "opcode"
    }
}

/// Copies a slice of memory into consecutive storage slots.
struct MemStorageGenerator;

impl Strategy for MemStorageGenerator {
    fn execute(&self, env: &mut Environment) {
        let mem_start = clamp_usize(env.filler.mem_int());
        let mem_size = env.filler.byte() as usize;
        let slot_start = clamp_usize(env.filler.mem_int());
        env.program.mem_to_storage(mem_start, mem_size, slot_start);
    }
    fn importance(&self) -> u8 {
        1
    }
    fn name(&self) -> &'static str {
        "mem_storage"
    }
}

struct MstoreGenerator;

impl Strategy for MstoreGenerator {
    fn execute(&self, env: &mut Environment) {
        let data = env.filler.byte_slice_256();
        let mem_start = clamp_usize(env.filler.mem_int());
        env.program.mstore_bytes(&data, mem_start);
    }
    fn importance(&self) -> u8 {
        3
    }
    fn name(&self) -> &'static str {
        "mstore"
    }
}

struct SstoreGenerator;

impl Strategy for SstoreGenerator {
    fn execute(&self, env: &mut Environment) {
        let len = (env.filler.byte() % 32) as usize;
        let data = env.filler.byte_slice(len);
        let slot = env.filler.mem_int();
        env.program.sstore(slot, U256::from_big_endian(&left_pad(&data)));
    }
    fn importance(&self) -> u8 {
        3
    }
    fn name(&self) -> &'static str {
        "sstore"
    }
}

struct TstoreGenerator;

impl Strategy for TstoreGenerator {
    fn execute(&self, env: &mut Environment) {
        let len = (env.filler.byte() % 32) as usize;
        let data = env.filler.byte_slice(len);
        let slot = env.filler.mem_int();
        env.program.tstore(slot, U256::from_big_endian(&left_pad(&data)));
    }
    fn importance(&self) -> u8 {
        3
    }
    fn name(&self) -> &'static str {
        "tstore"
    }
}

struct ReturnDataGenerator;

impl Strategy for ReturnDataGenerator {
    fn execute(&self, env: &mut Environment) {
        let data = env.filler.byte_slice_256();
        env.program.return_data(&data);
    }
    fn importance(&self) -> u8 {
        1
    }
    fn name(&self) -> &'static str {
        "return_data"
    }
}

struct ReturnGenerator;

impl Strategy for ReturnGenerator {
    fn execute(&self, env: &mut Environment) {
        let offset = env.filler.mem_int();
        let len = env.filler.mem_int();
        env.program.return_(offset, len);
    }
    fn importance(&self) -> u8 {
        1
    }
    fn name(&self) -> &'static str {
        "return"
    }
}

struct PushGenerator;

impl Strategy for PushGenerator {
    fn execute(&self, env: &mut Environment) {
        let len = (env.filler.byte() % 32) as usize;
        let bytes = env.filler.byte_slice(len);
        env.program.push_bytes(&bytes);
    }
    fn importance(&self) -> u8 {
        4
    }
    fn name(&self) -> &'static str {
        "push"
    }
}

/// `RETURNDATASIZE; PUSH0; MSIZE; RETURNDATACOPY; MSIZE; PUSH0; KECCAK256;
/// DUP1; SSTORE` — hashes whatever the last call returned and stores the
/// digest, keyed by itself.
struct HashAndStoreGenerator;

impl Strategy for HashAndStoreGenerator {
    fn execute(&self, env: &mut Environment) {
        env.program
            .op(OpCode::RETURNDATASIZE)
            .push(U256::zero())
            .op(OpCode::MSIZE)
            .op(OpCode::RETURNDATACOPY)
            .op(OpCode::MSIZE)
            .push(U256::zero())
            .op(OpCode::KECCAK256)
            .op(OpCode::DUP1)
            .op(OpCode::SSTORE);
    }
    fn importance(&self) -> u8 {
        2
    }
    fn name(&self) -> &'static str {
        "hash_and_store"
    }
}

struct MloadGenerator;

impl Strategy for MloadGenerator {
    fn execute(&self, env: &mut Environment) {
        let offset = env.filler.mem_int();
        env.program.push(offset).op(OpCode::MLOAD);
    }
    fn importance(&self) -> u8 {
        1
    }
    fn name(&self) -> &'static str {
        "mload"
    }
}

struct SloadGenerator;

impl Strategy for SloadGenerator {
    fn execute(&self, env: &mut Environment) {
        let offset = env.filler.mem_int();
        env.program.push(offset).op(OpCode::SLOAD);
    }
    fn importance(&self) -> u8 {
        1
    }
    fn name(&self) -> &'static str {
        "sload"
    }
}

struct TloadGenerator;

impl Strategy for TloadGenerator {
    fn execute(&self, env: &mut Environment) {
        let offset = env.filler.mem_int();
        env.program.push(offset).op(OpCode::TLOAD);
    }
    fn importance(&self) -> u8 {
        1
    }
    fn name(&self) -> &'static str {
        "tload"
    }
}

struct BlobhashGenerator;

impl Strategy for BlobhashGenerator {
    fn execute(&self, env: &mut Environment) {
        let offset = env.filler.mem_int();
        env.program.push(offset).op(OpCode::BLOBHASH);
    }
    fn importance(&self) -> u8 {
        1
    }
    fn name(&self) -> &'static str {
        "blobhash"
    }
}

fn left_pad(data: &[u8]) -> [u8; 32] {
    let mut word = [0u8; 32];
    let start = 32 - data.len().min(32);
    word[start..].copy_from_slice(&data[data.len().saturating_sub(32)..]);
    word
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembler::Program;
    use crate::jumptable::Jumptable;

    fn run(strategy: &dyn Strategy, seed: Vec<u8>) -> Vec<u8> {
        let mut filler = Filler::new(seed);
        let mut program = Program::new();
        let mut jt = Jumptable::new(10);
        let mut env = Environment {
            filler: &mut filler,
            program: &mut program,
            jumptable: &mut jt,
            max_code_size: 10_000,
            recursion_budget: 0,
        };
        strategy.execute(&mut env);
        program.bytes()
    }

    use crate::filler::Filler;

    #[test]
    fn push_generator_emits_well_formed_code() {
        let code = run(&PushGenerator, vec![5, 1, 2, 3, 4, 5, 6, 7, 8]);
        assert!(!code.is_empty());
        let op = OpCode::from_u8(code[0]).unwrap();
        assert!(op.is_push());
    }

    #[test]
    fn hash_and_store_emits_nine_opcodes() {
        let code = run(&HashAndStoreGenerator, vec![0u8; 4]);
        // RETURNDATASIZE, PUSH1 0, MSIZE, RETURNDATACOPY, MSIZE, PUSH1 0,
        // KECCAK256, DUP1, SSTORE = 9 ops, two of which carry an immediate.
        assert_eq!(code.last(), Some(&OpCode::SSTORE.to_u8()));
    }
}
