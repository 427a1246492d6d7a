//! Jumpdest-declaration and jump/jumpi strategies.
//!
//! Grounded on `generator/jump_strategies.go`.

use ethereum_types::U256;

use super::{Environment, Strategy};

pub fn register(out: &mut Vec<Box<dyn Strategy>>) {
    out.push(Box::new(JumpdestGenerator));
    out.push(Box::new(JumpGenerator));
}

/// Records a jumpdest candidate. Most of the time it's a real `JUMPDEST`
/// byte; occasionally it's a bare label (no byte emitted) or an
/// out-of-thin-air destination, which gives the resolver candidates that
/// don't actually point at valid jump targets — deliberately, since a real
/// EVM trapping on an invalid destination is itself a useful signal.
struct JumpdestGenerator;

impl Strategy for JumpdestGenerator {
    fn execute(&self, env: &mut Environment) {
        match env.filler.byte() % 10 {
            0 => {
                let label = env.program.label();
                env.jumptable.push(label, label);
            }
            1 => {
                let dest = env.filler.uint16() as usize;
                let label = env.program.label();
                env.jumptable.push(dest, label);
            }
            _ => {
                let label = env.program.label();
                let dest = env.program.jumpdest();
                env.jumptable.push(dest, label);
            }
        }
    }
    fn importance(&self) -> u8 {
        5
    }
    fn name(&self) -> &'static str {
        "jumpdest"
    }
}

/// Emits either a `JUMP` or `JUMPI` to a not-yet-known destination via the
/// jumptable's deferred-resolution sentinel.
struct JumpGenerator;

impl Strategy for JumpGenerator {
    fn execute(&self, env: &mut Environment) {
        if env.filler.bool() {
            env.program.jump_deferred(env.jumptable);
        } else {
            let should_jump = env.filler.bool();
            let condition = if should_jump {
                env.filler.big_int_32()
            } else {
                U256::zero()
            };
            let site = env.program.pc();
            let sentinel = env.jumptable.pop(site);
            env.program.push(condition);
            env.program.push8_fixed(sentinel);
            env.program.op(crate::opcode::OpCode::JUMPI);
        }
    }
    fn importance(&self) -> u8 {
        7
    }
    fn name(&self) -> &'static str {
        "jump"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembler::Program;
    use crate::filler::Filler;
    use crate::jumptable::Jumptable;
    use crate::opcode::OpCode;

    #[test]
    fn jump_generator_always_emits_a_jump_family_opcode() {
        for byte in [0u8, 255u8] {
            let mut filler = Filler::new(vec![byte; 16]);
            let mut program = Program::new();
            let mut jt = Jumptable::new(10);
            let mut env = Environment {
                filler: &mut filler,
                program: &mut program,
                jumptable: &mut jt,
                max_code_size: 10_000,
                recursion_budget: 0,
            };
            JumpGenerator.execute(&mut env);
            let code = program.bytes();
            let last = OpCode::from_u8(*code.last().unwrap()).unwrap();
            assert!(matches!(last, OpCode::JUMP | OpCode::JUMPI));
        }
    }
}
