//! External EVM binary adapter.
//!
//! Spawning and protocol details of any particular EVM binary are out of
//! scope; what's in scope is the narrow contract the differential runner
//! needs: "run this state test file, hand back trace bytes." Grounded on
//! `stylus-tools::core::debugger`'s `std::process::Command`/`Stdio` usage
//! and its `CommandFailure`/`ProcessOutput` pattern for turning a
//! subprocess's exit status into a value rather than a crash.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::error::{Error, Result};

/// Abstracts over "an external EVM implementation that can run one or many
/// state tests and yield trace bytes." Exit code is read but, per the
/// external-interfaces contract, never treated as failure for comparison
/// purposes on its own — only logged.
pub trait VmBackend: Send + Sync {
    fn name(&self) -> &str;

    fn run(&self, test_path: &Path) -> Result<Vec<u8>>;

    /// Runs `test_paths` in one invocation where the backend supports it.
    /// The default falls back to one subprocess per test; backends that
    /// implement true batching should override this for better throughput.
    fn run_batch(&self, test_paths: &[PathBuf]) -> Result<Vec<Vec<u8>>> {
        test_paths.iter().map(|p| self.run(p)).collect()
    }
}

/// A `VmBackend` implemented by spawning an external program once per
/// invocation.
#[derive(Clone, Debug)]
pub struct ExternalBinary {
    name: String,
    program: PathBuf,
    extra_args: Vec<String>,
}

impl ExternalBinary {
    pub fn new(name: impl Into<String>, program: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            program: program.into(),
            extra_args: Vec::new(),
        }
    }

    pub fn with_args(mut self, args: impl IntoIterator<Item = String>) -> Self {
        self.extra_args.extend(args);
        self
    }

    fn spawn(&self, test_paths: &[&Path]) -> Result<std::process::Output> {
        let mut command = Command::new(&self.program);
        command
            .args(&self.extra_args)
            .args(test_paths)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        tracing::debug!(backend = %self.name, program = %self.program.display(), "spawning vm backend");
        command.output().map_err(|source| Error::Vm {
            backend: self.name.clone(),
            source,
        })
    }
}

impl VmBackend for ExternalBinary {
    fn name(&self) -> &str {
        &self.name
    }

    fn run(&self, test_path: &Path) -> Result<Vec<u8>> {
        let output = self.spawn(&[test_path])?;
        if !output.status.success() {
            tracing::warn!(
                backend = %self.name,
                code = ?output.status.code(),
                "vm backend exited non-zero; comparing traces regardless"
            );
        }
        Ok(output.stdout)
    }

    fn run_batch(&self, test_paths: &[PathBuf]) -> Result<Vec<Vec<u8>>> {
        let paths: Vec<&Path> = test_paths.iter().map(PathBuf::as_path).collect();
        let output = self.spawn(&paths)?;
        let traces = split_batch_output(&output.stdout, test_paths.len());
        if traces.len() != test_paths.len() {
            return Err(Error::BatchSizeMismatch {
                backend: self.name.clone(),
                expected: test_paths.len(),
                got: traces.len(),
            });
        }
        Ok(traces)
    }
}

/// Batched output is concatenated with a `\0` delimiter between tests.
const BATCH_DELIMITER: u8 = 0;

fn split_batch_output(raw: &[u8], expected: usize) -> Vec<Vec<u8>> {
    if expected <= 1 {
        return vec![raw.to_vec()];
    }
    raw.split(|&b| b == BATCH_DELIMITER)
        .map(|chunk| chunk.to_vec())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_delimiter() {
        let raw = b"trace one\0trace two\0trace three".to_vec();
        let traces = split_batch_output(&raw, 3);
        assert_eq!(traces.len(), 3);
        assert_eq!(traces[1], b"trace two");
    }

    #[test]
    fn single_test_is_not_split() {
        let raw = b"only one trace\0but has a literal null".to_vec();
        let traces = split_batch_output(&raw, 1);
        assert_eq!(traces.len(), 1);
        assert_eq!(traces[0], raw);
    }
}
