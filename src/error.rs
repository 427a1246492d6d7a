//! Crate-wide error taxonomy.
//!
//! Mirrors the policy table in the design doc: seed rejection is a signal,
//! not a fault; I/O, subprocess and JSON failures propagate as values; a
//! broken invariant inside synthesis stays a panic, since it indicates a
//! programming bug rather than bad input.

use std::path::PathBuf;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The seed handed to the entry point was shorter than the minimum
    /// useful length. Not a fault: the caller should reject the input.
    #[error("seed too short: got {got} bytes, need at least {min}")]
    SeedTooShort { got: usize, min: usize },

    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("vm backend {backend} failed: {source}")]
    Vm {
        backend: String,
        #[source]
        source: std::io::Error,
    },

    #[error("vm backend {backend} exited with non-zero status {code:?}")]
    VmExit { backend: String, code: Option<i32> },

    #[error("content hash mismatch for {name}: expected {expected}, computed {computed}")]
    HashMismatch {
        name: String,
        expected: String,
        computed: String,
    },

    #[error("batched vm backend {backend} returned {got} outputs for {expected} tests")]
    BatchSizeMismatch {
        backend: String,
        expected: usize,
        got: usize,
    },
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
