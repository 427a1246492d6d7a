//! Content-addressed, sharded on-disk storage for generated tests, plus an
//! in-memory code dedup cache.
//!
//! Layout matches the external-interfaces contract: `out/<shard>/<name>.json`
//! sharded by the first hex byte of the content hash into `00`..`ff`. The
//! output directory is append-only from the generator's point of view;
//! filenames are content-hashed so two tasks only collide when generating
//! identical tests, which is handled as a dedup no-op rather than an error.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use crate::error::{Error, Result};
use crate::statetest::StateTest;

/// Sharded, content-addressed store for `StateTest` artifacts.
pub struct TestStore {
    root: PathBuf,
}

impl TestStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn shard_path(&self, content_hash: &str, name: &str) -> PathBuf {
        let shard = &content_hash[..2.min(content_hash.len())];
        self.root.join(shard).join(format!("{name}.json"))
    }

    /// Writes `test` under `name`, returning `false` without writing if a
    /// file already sits at the target path (a duplicate test is a no-op,
    /// not an error).
    pub fn save(&self, name: &str, test: &StateTest) -> Result<bool> {
        let hash = test.content_hash()?;
        let path = self.shard_path(&hash, name);
        if path.exists() {
            return Ok(false);
        }
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }
        let json = test.canonical_json()?;
        std::fs::write(&path, &json).map_err(|e| Error::io(&path, e))?;
        Ok(true)
    }

    /// Removes a saved test and any sibling trace file, called once every
    /// configured backend agrees on its trace.
    pub fn purge(&self, name: &str, content_hash: &str) -> Result<()> {
        let path = self.shard_path(content_hash, name);
        if path.exists() {
            std::fs::remove_file(&path).map_err(|e| Error::io(&path, e))?;
        }
        let trace_path = path.with_extension("trace.jsonl");
        if trace_path.exists() {
            std::fs::remove_file(&trace_path).map_err(|e| Error::io(&trace_path, e))?;
        }
        Ok(())
    }

    pub fn path_for(&self, content_hash: &str, name: &str) -> PathBuf {
        self.shard_path(content_hash, name)
    }

    /// Number of on-disk tests, used by the orchestrator's cancellation
    /// watcher to decide whether to pause intake.
    pub fn count(&self) -> usize {
        walk_json_files(&self.root).count()
    }
}

fn walk_json_files(root: &Path) -> impl Iterator<Item = PathBuf> {
    let mut out = Vec::new();
    if let Ok(shards) = std::fs::read_dir(root) {
        for shard in shards.flatten() {
            if let Ok(files) = std::fs::read_dir(shard.path()) {
                for f in files.flatten() {
                    if f.path().extension().is_some_and(|e| e == "json") {
                        out.push(f.path());
                    }
                }
            }
        }
    }
    out.into_iter()
}

/// In-memory dedup of generated code bodies by content hash, guarded by a
/// single lock (single-writer/multi-reader per the shared-resource policy).
/// `parking_lot` is used here, matching the `cargo-stylus`/`stylus-tools`
/// dependency on it.
pub struct CodeCache {
    seen: Mutex<HashSet<String>>,
}

impl CodeCache {
    pub fn new() -> Self {
        Self {
            seen: Mutex::new(HashSet::new()),
        }
    }

    /// Returns `true` if `code`'s hash was already recorded, inserting it
    /// either way.
    pub fn seen_before(&self, code: &[u8]) -> bool {
        use sha3::{Digest, Sha3_256};
        let mut hasher = Sha3_256::new();
        hasher.update(code);
        let digest = hex::encode(hasher.finalize());
        let mut seen = self.seen.lock();
        !seen.insert(digest)
    }
}

impl Default for CodeCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::FuzzConfig;
    use crate::filler::Filler;

    #[test]
    fn duplicate_save_is_a_no_op() {
        let dir = tempfile::tempdir().unwrap();
        let store = TestStore::new(dir.path());
        let cfg = FuzzConfig::default();
        let mut filler = Filler::new(vec![9u8; 32]);
        let test = StateTest::wrap(vec![0x60, 0x00], &mut filler, &cfg);

        assert!(store.save("dup", &test).unwrap());
        assert!(!store.save("dup", &test).unwrap());
        assert_eq!(store.count(), 1);
    }

    #[test]
    fn purge_removes_file_and_sibling_trace() {
        let dir = tempfile::tempdir().unwrap();
        let store = TestStore::new(dir.path());
        let cfg = FuzzConfig::default();
        let mut filler = Filler::new(vec![3u8; 32]);
        let test = StateTest::wrap(vec![0x00], &mut filler, &cfg);
        store.save("gone", &test).unwrap();
        let hash = test.content_hash().unwrap();

        store.purge("gone", &hash).unwrap();
        assert_eq!(store.count(), 0);
    }

    #[test]
    fn code_cache_flags_repeats() {
        let cache = CodeCache::new();
        assert!(!cache.seen_before(b"abc"));
        assert!(cache.seen_before(b"abc"));
        assert!(!cache.seen_before(b"xyz"));
    }
}
