//! Single public pipeline entry point: seed in, verdict out.
//!
//! Grounded on `fuzzer/fuzzer.go`'s `Fuzz` function (the go-fuzz entry
//! point), reworked to return a value instead of writing straight to disk
//! and panicking on failure: `Fuzz` rejects seeds under 32 bytes by
//! returning `-1`, which becomes [`Error::SeedTooShort`] here.

use crate::env::FuzzConfig;
use crate::error::{Error, Result};
use crate::filler::Filler;
use crate::runner::{self, RunOutcome};
use crate::statetest::{StateTest, TestArtifact};
use crate::store::TestStore;
use crate::synth;
use crate::vm::{ExternalBinary, VmBackend};

/// The shortest seed the pipeline will synthesize from, per `fuzzer.go`'s
/// `len(data) < 32` guard.
pub const MIN_SEED_LEN: usize = 32;

/// The outcome of running one synthesised test through the full pipeline.
#[derive(Debug)]
pub struct Verdict {
    pub agreed: bool,
    pub artifact: TestArtifact,
    pub test: StateTest,
    /// Present only when at least one VM backend was configured.
    pub run_outcome: Option<RunOutcome>,
}

/// Synthesises a `StateTest` from `seed` and, if `cfg` names any VM
/// backends, runs it through the differential runner. With no backends
/// configured, synthesis alone succeeds and `agreed` is reported `true` —
/// there's nothing to disagree with.
pub fn fuzz_one(seed: &[u8], cfg: &FuzzConfig) -> Result<Verdict> {
    if seed.len() < MIN_SEED_LEN {
        return Err(Error::SeedTooShort {
            got: seed.len(),
            min: MIN_SEED_LEN,
        });
    }

    let span = tracing::info_span!("fuzz_one", seed_len = seed.len());
    let _guard = span.enter();

    let mut filler = Filler::new(seed.to_vec());
    let code = {
        let _s = tracing::info_span!("synthesize").entered();
        synth::synthesize_with_jump_distance(
            &mut filler,
            cfg.max_code_size,
            cfg.max_recursion_depth,
            cfg.jump_min_distance,
        )
    };

    let test = StateTest::wrap(code, &mut filler, cfg);
    let artifact = TestArtifact::from_test(&test)?;

    if cfg.vm_backends.is_empty() {
        return Ok(Verdict {
            agreed: true,
            artifact,
            test,
            run_outcome: None,
        });
    }

    let store = TestStore::new(&cfg.out_dir);
    store.save(&artifact.name, &test)?;
    let test_path = store.path_for(&artifact.content_hash, &artifact.name);

    let backends: Vec<Box<dyn VmBackend>> = cfg
        .vm_backends
        .iter()
        .map(|b| {
            Box::new(
                ExternalBinary::new(b.name.clone(), b.program.clone())
                    .with_args(b.extra_args.clone()),
            ) as Box<dyn VmBackend>
        })
        .collect();

    let outcome = {
        let _s = tracing::info_span!("differential_run").entered();
        runner::run_one(&test_path, &artifact.name, &backends)?
    };

    if outcome.agreed {
        if cfg.purge_on_agreement {
            store.purge(&artifact.name, &artifact.content_hash)?;
        }
    } else {
        runner::dump_crashers(&outcome, cfg)?;
    }

    Ok(Verdict {
        agreed: outcome.agreed,
        artifact,
        test,
        run_outcome: Some(outcome),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_under_minimum_length_is_rejected() {
        let cfg = FuzzConfig::default();
        let err = fuzz_one(&[0u8; 31], &cfg).unwrap_err();
        assert!(matches!(err, Error::SeedTooShort { got: 31, min: 32 }));
    }

    #[test]
    fn no_backends_configured_means_synthesis_alone_succeeds() {
        let cfg = FuzzConfig::default().with_vm_backends(Vec::new());
        let seed = vec![0x5Au8; 32];
        let verdict = fuzz_one(&seed, &cfg).unwrap();
        assert!(verdict.agreed);
        assert!(verdict.run_outcome.is_none());
        assert_eq!(verdict.test.genesis.len(), 2);
    }

    #[test]
    fn same_seed_twice_yields_the_same_content_hash() {
        let cfg = FuzzConfig::default();
        let seed = b"asdfasdfasdfasdfasdfasdfasdffasdfasdfasdfasdfasd".to_vec();
        let a = fuzz_one(&seed, &cfg).unwrap();
        let b = fuzz_one(&seed, &cfg).unwrap();
        assert_eq!(a.artifact.content_hash, b.artifact.content_hash);
    }
}
