//! Differential fuzzer for EVM implementations: the test-synthesis core.
//!
//! Turns a finite entropy seed into a syntactically valid EVM state test —
//! entropy reader, opcode assembler, weighted strategy scheduler, deferred
//! jump resolution, test wrapping — then optionally runs that test against
//! several external EVM binaries and reports whether their traces agree.
//! Spawning and supervising those external binaries beyond the narrow
//! [`vm::VmBackend`] contract, corpus management, and CLI/flag handling are
//! the surrounding driver's job, not this crate's.

pub mod assembler;
pub mod env;
pub mod error;
pub mod filler;
pub mod fuzz;
pub mod jumptable;
pub mod minimiser;
pub mod opcode;
pub mod runner;
pub mod statetest;
pub mod store;
pub mod strategies;
pub mod synth;
pub mod vm;

pub use env::FuzzConfig;
pub use error::{Error, Result};
pub use fuzz::{fuzz_one, Verdict, MIN_SEED_LEN};
pub use statetest::{StateTest, TestArtifact};
