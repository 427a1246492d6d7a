//! Bisection-based minimiser: shrinks a test's largest-code account under
//! the invariant that the reference trace is preserved.
//!
//! Uses the exact same comparator the differential runner uses for the
//! agreement verdict ([`crate::runner::traces_agree`]), per the invariant
//! that minimisation must never be able to hide a real divergence behind a
//! looser equality check than the one the runner applies.

use std::path::Path;

use crate::error::Result;
use crate::runner::traces_agree;
use crate::statetest::StateTest;
use crate::vm::VmBackend;

/// Bytes appended after the minimal reproducing length, so downstream
/// diffs retain a bit of surrounding context instead of stopping exactly
/// at the last byte that mattered.
pub const MARGIN: usize = 100;

/// Re-runs `test` (with its largest-code account's code replaced by the
/// first `len` bytes of its original code) against `reference` and reports
/// whether the resulting trace still matches `reference_trace`.
fn reproduces_at_length(
    test: &StateTest,
    original_code: &[u8],
    len: usize,
    reference: &dyn VmBackend,
    reference_trace: &[u8],
    write_candidate: impl Fn(&StateTest) -> Result<std::path::PathBuf>,
) -> Result<bool> {
    let mut candidate = test.clone();
    let addr = *candidate
        .largest_code_account()
        .expect("state test always has a largest-code account");
    candidate.set_code(&addr, original_code[..len].to_vec());
    let path = write_candidate(&candidate)?;
    let trace = reference.run(&path)?;
    Ok(traces_agree(&trace, reference_trace))
}

/// Shrinks `test`'s largest-code account to the shortest prefix (plus
/// [`MARGIN`]) that still reproduces `reference_trace` against
/// `reference`. `write_candidate` persists a candidate test to a path the
/// backend can run, and is left to the caller so the minimiser stays
/// agnostic to the storage layer.
pub fn minimise(
    test: &StateTest,
    reference_trace: &[u8],
    reference: &dyn VmBackend,
    write_candidate: impl Fn(&StateTest) -> Result<std::path::PathBuf>,
) -> Result<StateTest> {
    let addr = match test.largest_code_account() {
        Some(addr) => *addr,
        None => return Ok(test.clone()),
    };
    let original_code = test.code_of(&addr).to_vec();

    if original_code.len() <= MARGIN {
        return Ok(test.clone());
    }

    let mut lo = 0usize;
    let mut hi = original_code.len();
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        if mid == lo {
            break;
        }
        if reproduces_at_length(
            test,
            &original_code,
            mid,
            reference,
            reference_trace,
            &write_candidate,
        )? {
            hi = mid;
        } else {
            lo = mid;
        }
    }
    // `hi` is the minimal length found to still reproduce; confirm it does
    // (the loop can exit with `lo == hi - 1` unconfirmed at `hi` itself).
    let minimal = if reproduces_at_length(
        test,
        &original_code,
        hi,
        reference,
        reference_trace,
        &write_candidate,
    )? {
        hi
    } else {
        original_code.len()
    };

    let kept = (minimal + MARGIN).min(original_code.len());
    let mut shrunk = test.clone();
    shrunk.set_code(&addr, original_code[..kept].to_vec());
    Ok(shrunk)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::FuzzConfig;
    use crate::filler::Filler;

    struct StubVm {
        executed_suffix_starts_failing_at: usize,
    }

    impl VmBackend for StubVm {
        fn name(&self) -> &str {
            "stub"
        }

        fn run(&self, test_path: &Path) -> Result<Vec<u8>> {
            let json = std::fs::read_to_string(test_path).unwrap();
            let test: StateTest = serde_json::from_str(&json)?;
            let addr = test.largest_code_account().unwrap();
            let len = test.code_of(addr).len();
            // Any code at least as long as the threshold reproduces the
            // same trace; shorter code "executes differently".
            if len >= self.executed_suffix_starts_failing_at {
                Ok(b"{\"pc\":1}\n{\"stateRoot\":\"0xaaa\"}".to_vec())
            } else {
                Ok(b"{\"pc\":1}\n{\"pc\":2}\n{\"stateRoot\":\"0xbbb\"}".to_vec())
            }
        }
    }

    fn write_to_temp(dir: &tempfile::TempDir) -> impl Fn(&StateTest) -> Result<std::path::PathBuf> + '_ {
        move |test: &StateTest| {
            let path = dir.path().join(format!("{}.json", test.content_hash()?));
            std::fs::write(&path, test.canonical_json()?).unwrap();
            Ok(path)
        }
    }

    #[test]
    fn converges_into_expected_range() {
        let cfg = FuzzConfig::default();
        let mut filler = Filler::new(vec![1u8; 32]);
        let mut code = vec![0x5Bu8; 500]; // 500 bytes of JUMPDEST
        code[..500].fill(0x5B);
        let test = StateTest::wrap(code, &mut filler, &cfg);

        let vm = StubVm {
            executed_suffix_starts_failing_at: 200,
        };
        let reference_trace = vm.run(&{
            let dir = tempfile::tempdir().unwrap();
            let write = write_to_temp(&dir);
            write(&test).unwrap()
        }).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let write = write_to_temp(&dir);
        let shrunk = minimise(&test, &reference_trace, &vm, write).unwrap();
        let addr = shrunk.largest_code_account().unwrap();
        let len = shrunk.code_of(addr).len();
        assert!((200..=300).contains(&len), "len={len}");
    }

    #[test]
    fn never_extends_code() {
        let cfg = FuzzConfig::default();
        let mut filler = Filler::new(vec![2u8; 32]);
        let code = vec![0x00u8; 50];
        let test = StateTest::wrap(code, &mut filler, &cfg);

        let vm = StubVm {
            executed_suffix_starts_failing_at: 0,
        };
        let dir = tempfile::tempdir().unwrap();
        let write = write_to_temp(&dir);
        let reference_trace = vm.run(&write(&test).unwrap()).unwrap();

        let dir2 = tempfile::tempdir().unwrap();
        let write2 = write_to_temp(&dir2);
        let shrunk = minimise(&test, &reference_trace, &vm, write2).unwrap();
        let addr = shrunk.largest_code_account().unwrap();
        assert!(shrunk.code_of(addr).len() <= test.code_of(addr).len());
    }
}
