//! Differential runner: executes a `StateTest` against every configured
//! VM backend and decides whether the resulting traces agree.
//!
//! Parallelism is a bounded `rayon` thread pool, grounded on the
//! `tokamak-network-ethrex` workspace's use of `rayon` for bounded
//! parallel fan-out, rather than hand-rolled thread spawning.

use std::path::{Path, PathBuf};

use crate::env::FuzzConfig;
use crate::error::Result;
use crate::vm::VmBackend;

/// The outcome of running one test against every configured backend.
#[derive(Debug)]
pub struct RunOutcome {
    pub test_name: String,
    pub agreed: bool,
    pub traces: Vec<(String, Vec<u8>)>,
}

/// Strips whatever the source treats as a trailing summary record (a
/// stateRoot/summary line whose formatting is allowed to differ across
/// VMs) and splits the remainder into lines for comparison.
///
/// The design note this resolves: the stripped form is authoritative for
/// the agreement verdict; a full line-diff (kept unstripped) is for human
/// inspection only, never for the verdict itself.
pub fn normalize_trace(trace: &[u8]) -> Vec<&[u8]> {
    let text = trace_sans_trailing_summary(trace);
    text.split(|&b| b == b'\n')
        .filter(|line| !line.is_empty())
        .collect()
}

/// Drops everything from the last `{` byte onward, which is where the
/// source's trailing summary/stateRoot record begins. If the trace has no
/// `{` at all, nothing is stripped.
fn trace_sans_trailing_summary(trace: &[u8]) -> &[u8] {
    match trace.iter().rposition(|&b| b == b'{') {
        Some(pos) => &trace[..pos],
        None => trace,
    }
}

/// Line-by-line equality of two normalised trace streams.
pub fn traces_agree(a: &[u8], b: &[u8]) -> bool {
    normalize_trace(a) == normalize_trace(b)
}

/// Runs `test_path` against every backend in `cfg.vm_backends` and reports
/// whether every pair of resulting traces agrees. No backend is treated as
/// a privileged reference; comparison is pairwise over all of them. Backend
/// invocations are fanned out over `rayon`'s global pool and joined before
/// comparison, per the "barrier joins before comparison" fan-out model.
pub fn run_one(
    test_path: &Path,
    test_name: &str,
    backends: &[Box<dyn VmBackend>],
) -> Result<RunOutcome> {
    use rayon::prelude::*;

    let traces: Vec<(String, Vec<u8>)> = backends
        .par_iter()
        .map(|vm| -> Result<(String, Vec<u8>)> {
            let bytes = vm.run(test_path)?;
            Ok((vm.name().to_string(), bytes))
        })
        .collect::<Result<_>>()?;

    let agreed = all_pairs_agree(&traces);
    Ok(RunOutcome {
        test_name: test_name.to_string(),
        agreed,
        traces,
    })
}

fn all_pairs_agree(traces: &[(String, Vec<u8>)]) -> bool {
    for i in 0..traces.len() {
        for j in (i + 1)..traces.len() {
            if !traces_agree(&traces[i].1, &traces[j].1) {
                return false;
            }
        }
    }
    true
}

/// Runs many tests concurrently, bounded by `cfg.executor_threads`. Both
/// levels of fan-out — across tests and, within each test, across VM
/// backends via `run_one` — share this same bounded pool, matching the "N
/// tests in parallel, M VMs fanned out within each" model. When
/// `cfg.batch_backends` is set and every backend supports it, tests are
/// instead handed to each backend in one batched invocation via
/// `VmBackend::run_batch`, per spec.md §4.8's batching capability.
pub fn run_many(
    tests: &[(PathBuf, String)],
    backends: &[Box<dyn VmBackend>],
    cfg: &FuzzConfig,
) -> Result<Vec<RunOutcome>> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(cfg.executor_threads.max(1))
        .build()
        .expect("thread pool construction cannot fail with a non-zero thread count");

    if cfg.batch_backends && !backends.is_empty() {
        return pool.install(|| run_batched(tests, backends));
    }

    pool.install(|| {
        use rayon::prelude::*;
        tests
            .par_iter()
            .map(|(path, name)| run_one(path, name, backends))
            .collect()
    })
}

/// Hands the full test-path list to every backend in one call each via
/// `VmBackend::run_batch`, fanned out across backends with `rayon`, then
/// regroups the per-backend trace vectors back into one `RunOutcome` per
/// test.
fn run_batched(tests: &[(PathBuf, String)], backends: &[Box<dyn VmBackend>]) -> Result<Vec<RunOutcome>> {
    use rayon::prelude::*;

    let paths: Vec<PathBuf> = tests.iter().map(|(p, _)| p.clone()).collect();
    let per_backend: Vec<(String, Vec<Vec<u8>>)> = backends
        .par_iter()
        .map(|vm| -> Result<(String, Vec<Vec<u8>>)> {
            let traces = vm.run_batch(&paths)?;
            if traces.len() != paths.len() {
                return Err(crate::error::Error::BatchSizeMismatch {
                    backend: vm.name().to_string(),
                    expected: paths.len(),
                    got: traces.len(),
                });
            }
            Ok((vm.name().to_string(), traces))
        })
        .collect::<Result<_>>()?;

    Ok(tests
        .iter()
        .enumerate()
        .map(|(i, (_, name))| {
            let traces: Vec<(String, Vec<u8>)> = per_backend
                .iter()
                .map(|(vm_name, vm_traces)| (vm_name.clone(), vm_traces[i].clone()))
                .collect();
            let agreed = all_pairs_agree(&traces);
            RunOutcome {
                test_name: name.clone(),
                agreed,
                traces,
            }
        })
        .collect())
}

/// On disagreement, dumps every backend's trace into `cfg.crashes_dir`
/// named `<test>-<vm>-trace.jsonl`, per the external-interfaces layout. The
/// test file itself is left in place.
pub fn dump_crashers(outcome: &RunOutcome, cfg: &FuzzConfig) -> Result<()> {
    std::fs::create_dir_all(&cfg.crashes_dir)
        .map_err(|e| crate::error::Error::io(&cfg.crashes_dir, e))?;
    for (vm_name, trace) in &outcome.traces {
        let path = cfg
            .crashes_dir
            .join(format!("{}-{}-trace.jsonl", outcome.test_name, vm_name));
        std::fs::write(&path, trace).map_err(|e| crate::error::Error::io(&path, e))?;
    }
    Ok(())
}
