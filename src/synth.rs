//! Ties the filler, scheduler and jumptable together into one synthesis
//! run. Factored out of the fuzz entry point so the recursive
//! `create_and_call` strategy can synthesize a child program the same way
//! the top-level entry point synthesizes the outer one.

use crate::assembler::Program;
use crate::filler::Filler;
use crate::jumptable::Jumptable;
use crate::strategies::{Environment, Scheduler};

/// Runs `counter = filler.byte()` generation rounds against a fresh
/// `Program`/`Jumptable`, resolving deferred jumps once finished. Synthesis
/// also stops early if the emitted bytecode exceeds `max_code_size`,
/// matching the fixed size cap in the round-termination contract.
pub fn synthesize(filler: &mut Filler, max_code_size: usize, recursion_budget: u32) -> Vec<u8> {
    synthesize_with_jump_distance(filler, max_code_size, recursion_budget, 10)
}

/// As [`synthesize`], but with an explicit minimum jump distance instead of
/// the default of 10, so callers threading a [`crate::env::FuzzConfig`]
/// through can honor its `jump_min_distance`.
pub fn synthesize_with_jump_distance(
    filler: &mut Filler,
    max_code_size: usize,
    recursion_budget: u32,
    jump_min_distance: usize,
) -> Vec<u8> {
    let scheduler = Scheduler::default_strategies();
    let mut program = Program::new();
    let mut jumptable = Jumptable::new(jump_min_distance);

    let rounds = filler.byte();
    for _ in 0..rounds {
        if program.len() >= max_code_size {
            break;
        }
        let mut env = Environment {
            filler,
            program: &mut program,
            jumptable: &mut jumptable,
            max_code_size,
            recursion_budget,
        };
        scheduler.run_round(&mut env);
    }

    let mut code = program.bytes();
    jumptable.insert_jumps(&mut code);
    code
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synthesis_produces_nonempty_bytecode_for_any_seed() {
        let mut filler = Filler::new(vec![0x5Au8; 32]);
        let code = synthesize(&mut filler, 10_000, 4);
        assert!(!code.is_empty());
    }

    #[test]
    fn synthesis_never_exceeds_the_size_cap_by_more_than_one_strategy() {
        let mut filler = Filler::new(b"asdfasdfasdfasdfasdfasdfasdffasdfasdfasdfasdfasd".to_vec());
        let code = synthesize(&mut filler, 64, 4);
        // A single strategy round may push the buffer somewhat past the
        // cap before the next round's pre-check stops it; it must not run
        // away unboundedly.
        assert!(code.len() < 64 + 4096);
    }

    #[test]
    fn synthesis_is_deterministic_for_a_fixed_seed() {
        let run = || {
            let mut filler = Filler::new(vec![0x11u8; 48]);
            synthesize(&mut filler, 2_000, 4)
        };
        assert_eq!(run(), run());
    }
}
