//! Contract-creation and call strategies.
//!
//! Grounded on `generator/call_strategies.go`.

use ethereum_types::U256;

use crate::opcode::OpCode;

use super::precompiles::{self, CallParams};
use super::{clamp_usize, Environment, Strategy};

pub fn register(out: &mut Vec<Box<dyn Strategy>>) {
    out.push(Box::new(CreateCallRngGenerator));
    out.push(Box::new(CreateCallGenerator));
    out.push(Box::new(RandomCallGenerator));
    out.push(Box::new(CallPrecompileGenerator));
}

const CALL_OPCODES: [OpCode; 4] = [
    OpCode::CALL,
    OpCode::CALLCODE,
    OpCode::DELEGATECALL,
    OpCode::STATICCALL,
];

fn pick_call_opcode(byte: u8) -> OpCode {
    CALL_OPCODES[(byte as usize) % CALL_OPCODES.len()]
}

/// Creates and calls a contract made of pure random bytes: exercises
/// whatever invalid-opcode/out-of-gas handling the callee's creation hits,
/// without any attempt at meaningful behavior.
struct CreateCallRngGenerator;

impl Strategy for CreateCallRngGenerator {
    fn execute(&self, env: &mut Environment) {
        let code = env.filler.byte_slice_256();
        let is_create2 = env.filler.bool();
        let call_op = pick_call_opcode(env.filler.byte());
        env.program.create_and_call(&code, is_create2, call_op);
    }
    fn importance(&self) -> u8 {
        4
    }
    fn name(&self) -> &'static str {
        "create_call_rng"
    }
}

/// Creates and calls a recursively-synthesized child program, guarded by a
/// task-local recursion budget rather than the source's process-global
/// counter: once the budget hits zero, this strategy degrades to a no-op
/// instead of recursing further.
struct CreateCallGenerator;

impl Strategy for CreateCallGenerator {
    fn execute(&self, env: &mut Environment) {
        if env.recursion_budget == 0 {
            return;
        }
        let seed_len = env.filler.uint16() as usize;
        let seed = env.filler.byte_slice(seed_len.min(4096));
        let mut child_filler = crate::filler::Filler::new(seed);
        let code = crate::synth::synthesize(&mut child_filler, env.max_code_size, env.recursion_budget - 1);
        let is_create2 = env.filler.bool();
        let call_op = pick_call_opcode(env.filler.byte());
        env.program.create_and_call(&code, is_create2, call_op);
    }
    fn importance(&self) -> u8 {
        5
    }
    fn name(&self) -> &'static str {
        "create_call_recursive"
    }
}

/// Calls either a precompile address (0..20) or a random 20-byte address,
/// with randomised gas/value/offsets, via the shared `CallRandomizer`.
struct RandomCallGenerator;

impl Strategy for RandomCallGenerator {
    fn execute(&self, env: &mut Environment) {
        let address = if env.filler.bool() {
            env.filler.big_int_16() % U256::from(20u8)
        } else {
            U256::from_big_endian(&env.filler.byte_slice(20))
        };
        let params = CallParams {
            gas: env.filler.gas_int(),
            address,
            value: env.filler.big_int_16(),
            in_offset: clamp_usize(env.filler.mem_int()),
            in_size: clamp_usize(env.filler.mem_int()),
            out_offset: clamp_usize(env.filler.mem_int()),
            out_size: clamp_usize(env.filler.mem_int()),
        };
        precompiles::call_randomizer(env, params);
    }
    fn importance(&self) -> u8 {
        4
    }
    fn name(&self) -> &'static str {
        "random_call"
    }
}

/// Invokes one of the registered precompile callers, each of which lays a
/// plausibly-shaped input into memory before calling its fixed address.
struct CallPrecompileGenerator;

impl Strategy for CallPrecompileGenerator {
    fn execute(&self, env: &mut Environment) {
        precompiles::call_precompile(env);
    }
    fn importance(&self) -> u8 {
        8
    }
    fn name(&self) -> &'static str {
        "call_precompile"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembler::Program;
    use crate::filler::Filler;
    use crate::jumptable::Jumptable;

    #[test]
    fn recursion_budget_zero_makes_recursive_generator_a_no_op() {
        let mut filler = Filler::new(vec![1, 2, 3, 4, 5, 6, 7, 8, 9, 10]);
        let mut program = Program::new();
        let mut jt = Jumptable::new(10);
        let mut env = Environment {
            filler: &mut filler,
            program: &mut program,
            jumptable: &mut jt,
            max_code_size: 10_000,
            recursion_budget: 0,
        };
        CreateCallGenerator.execute(&mut env);
        assert!(program.is_empty());
    }
}
