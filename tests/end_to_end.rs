//! End-to-end scenarios over literal seeds, exercising the full
//! seed -> synthesis -> StateTest pipeline rather than any one module in
//! isolation.

use evmfuzz::env::FuzzConfig;
use evmfuzz::fuzz_one;

/// S1: 32 bytes of `0x5A` must synthesize successfully, produce non-empty
/// bytecode, and wrap into a `StateTest` with exactly two accounts.
#[test]
fn s1_uniform_seed_produces_a_two_account_test() {
    let cfg = FuzzConfig::default();
    let seed = vec![0x5Au8; 32];
    let verdict = fuzz_one(&seed, &cfg).expect("synthesis must succeed for a 32-byte seed");

    assert!(verdict.agreed);
    assert_eq!(verdict.test.genesis.len(), 2);

    let largest = verdict
        .test
        .largest_code_account()
        .expect("at least one account carries code");
    assert!(!verdict.test.code_of(largest).is_empty());

    // The artifact's JSON bytes must themselves parse back as a StateTest.
    let parsed: evmfuzz::StateTest =
        serde_json::from_slice(&verdict.artifact.json_bytes).expect("artifact JSON must parse");
    assert_eq!(parsed.genesis.len(), 2);
}

/// S2: a 48-byte ASCII seed completes and, run twice, produces identical
/// content hashes (and therefore the same on-disk file name).
#[test]
fn s2_ascii_seed_is_deterministic_across_runs() {
    let cfg = FuzzConfig::default();
    let seed = b"asdfasdfasdfasdfasdfasdfasdffasdfasdfasdfasdfasd".to_vec();

    let a = fuzz_one(&seed, &cfg).unwrap();
    let b = fuzz_one(&seed, &cfg).unwrap();

    assert_eq!(a.artifact.content_hash, b.artifact.content_hash);
    assert_eq!(a.artifact.name, b.artifact.name);
    assert_eq!(a.artifact.json_bytes, b.artifact.json_bytes);
}

/// Seeds shorter than the 32-byte minimum are rejected outright, never
/// synthesized from.
#[test]
fn seed_too_short_is_rejected_without_synthesis() {
    let cfg = FuzzConfig::default();
    let err = fuzz_one(&[1, 2, 3], &cfg).unwrap_err();
    assert!(matches!(
        err,
        evmfuzz::Error::SeedTooShort { got: 3, min: 32 }
    ));
}

/// S6: wrapping the same seed twice and saving both through the storage
/// layer results in only one file on disk, and the second save is reported
/// as a no-op rather than an error.
#[test]
fn s6_duplicate_test_is_deduplicated_on_disk() {
    use evmfuzz::store::TestStore;

    let dir = tempfile::tempdir().unwrap();
    let store = TestStore::new(dir.path());
    let cfg = FuzzConfig::default();

    let mut filler = evmfuzz::filler::Filler::new(vec![9u8; 32]);
    let code = evmfuzz::synth::synthesize(&mut filler, cfg.max_code_size, cfg.max_recursion_depth);
    let test = evmfuzz::StateTest::wrap(code, &mut filler, &cfg);

    assert!(store.save("dup-test", &test).unwrap());
    assert!(!store.save("dup-test", &test).unwrap());
    assert_eq!(store.count(), 1);
}
