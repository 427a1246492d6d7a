//! `StateTest` data model and the test wrapper that builds one around
//! synthesised bytecode.
//!
//! The JSON shape here is the canonical Ethereum `GeneralStateTest` schema:
//! a top-level mapping from test name to a single-transaction fixture.
//! Balances and nonces are serialised as `0x`-prefixed hex strings, not JSON
//! numbers, per `generator.go`'s use of `hexutil`/`big.Int` fields and
//! because a synthesised balance can exceed what a JSON number represents
//! losslessly.

use std::collections::BTreeMap;

use ethereum_types::{Address, H256, U256};
use serde::{Deserialize, Serialize};
use sha3::{Digest, Sha3_256};

use crate::env::FuzzConfig;
use crate::filler::Filler;

/// The fixed sender address used for every generated test. Its private key
/// below is a well-known secp256k1 test scalar; this is a fixture used to
/// sign synthesised transactions and is never used against a real chain.
pub const SENDER_ADDRESS: Address = Address(hex_literal::hex!(
    "a94f5374fce5edbc8e2a8697c15331677e6ebf0b"
));

/// Well-known test secret key, matching `generator.go`'s `sk`.
pub const SENDER_KEY: [u8; 32] =
    hex_literal::hex!("45a915e4d060149eb4365960e6a7a45f334393093061116b197e3240065ff2d");

/// The fixed address the synthesised code is deployed to, matching the
/// literal `0x0000ca1100f022` (left-padded to a full 20-byte address).
pub const CALLEE_ADDRESS: Address = Address(hex_literal::hex!(
    "000000000000000000000000000000ca1100f022"
));

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct GenesisAccount {
    pub nonce: String,
    pub balance: String,
    pub storage: BTreeMap<H256, H256>,
    #[serde(with = "hex_bytes")]
    pub code: Vec<u8>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Transaction {
    pub gas_limit: Vec<u64>,
    pub nonce: String,
    pub value: String,
    pub data: String,
    pub gas_price: String,
    pub to: Address,
    pub sender: Address,
    #[serde(with = "hex_bytes")]
    pub sender_key: Vec<u8>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct StateTest {
    pub genesis: BTreeMap<Address, GenesisAccount>,
    pub tx: Transaction,
    pub fork: String,
}

impl StateTest {
    /// Wraps `code` into a complete two-account state test: a funded sender
    /// with no code, and a callee holding `code`, called by a single signed
    /// transaction with randomised value/data.
    pub fn wrap(code: Vec<u8>, filler: &mut Filler, cfg: &FuzzConfig) -> Self {
        let mut genesis = BTreeMap::new();
        genesis.insert(
            SENDER_ADDRESS,
            GenesisAccount {
                nonce: "0x0".to_string(),
                balance: "0x3fffffffffffffff".to_string(),
                storage: BTreeMap::new(),
                code: Vec::new(),
            },
        );
        genesis.insert(
            CALLEE_ADDRESS,
            GenesisAccount {
                nonce: "0x0".to_string(),
                balance: "0x0".to_string(),
                storage: BTreeMap::new(),
                code,
            },
        );

        let tx = Transaction {
            gas_limit: vec![20_000_000],
            nonce: "0x0".to_string(),
            value: to_hex(&filler.byte_slice(4)),
            data: to_hex(&filler.byte_slice(100)),
            gas_price: "0x80".to_string(),
            to: CALLEE_ADDRESS,
            sender: SENDER_ADDRESS,
            sender_key: SENDER_KEY.to_vec(),
        };

        Self {
            genesis,
            tx,
            fork: cfg.fork.clone(),
        }
    }

    /// Returns the canonical JSON encoding used for both on-disk storage
    /// and content hashing. The only authoritative serialisation: two
    /// equal `StateTest`s must produce byte-identical output here.
    pub fn canonical_json(&self) -> crate::error::Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    pub fn content_hash(&self) -> crate::error::Result<String> {
        let bytes = self.canonical_json()?;
        let mut hasher = Sha3_256::new();
        hasher.update(&bytes);
        Ok(hex::encode(hasher.finalize()))
    }

    /// The largest-code account currently present, used by the minimiser
    /// to find the contract worth shrinking.
    pub fn largest_code_account(&self) -> Option<&Address> {
        self.genesis
            .iter()
            .max_by_key(|(_, acc)| acc.code.len())
            .map(|(addr, _)| addr)
    }

    pub fn code_of(&self, addr: &Address) -> &[u8] {
        self.genesis
            .get(addr)
            .map(|a| a.code.as_slice())
            .unwrap_or(&[])
    }

    pub fn set_code(&mut self, addr: &Address, code: Vec<u8>) {
        if let Some(acc) = self.genesis.get_mut(addr) {
            acc.code = code;
        }
    }
}

/// A generated test together with its canonical encoding and content hash,
/// the unit the storage layer and crashers directory key off of.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TestArtifact {
    pub name: String,
    pub json_bytes: Vec<u8>,
    pub content_hash: String,
}

impl TestArtifact {
    /// Builds an artifact from a finished `StateTest`, naming it after its
    /// own content hash.
    pub fn from_test(test: &StateTest) -> crate::error::Result<Self> {
        let json_bytes = test.canonical_json()?;
        let content_hash = test.content_hash()?;
        Ok(Self {
            name: format!("fuzz-{content_hash}"),
            json_bytes,
            content_hash,
        })
    }
}

fn to_hex(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], s: S) -> Result<S::Ok, S::Error> {
        format!("0x{}", hex::encode(bytes)).serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(d)?;
        let s = s.strip_prefix("0x").unwrap_or(&s);
        hex::decode(s).map_err(serde::de::Error::custom)
    }
}

/// A fixed 256-bit analogue of [`U256`] kept here only so downstream
/// modules don't need to depend on `ethereum_types` directly for the one
/// conversion they need.
pub fn u256_hex(v: U256) -> String {
    format!("0x{v:x}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrapped_test_has_exactly_two_accounts() {
        let cfg = FuzzConfig::default();
        let mut filler = Filler::new(vec![0x5A; 32]);
        let test = StateTest::wrap(vec![0x00], &mut filler, &cfg);
        assert_eq!(test.genesis.len(), 2);
        assert!(test.genesis.contains_key(&SENDER_ADDRESS));
        assert!(test.genesis.contains_key(&CALLEE_ADDRESS));
    }

    #[test]
    fn content_hash_is_stable_across_two_encodings() {
        let cfg = FuzzConfig::default();
        let mut f1 = Filler::new(vec![7u8; 32]);
        let mut f2 = Filler::new(vec![7u8; 32]);
        let a = StateTest::wrap(vec![1, 2, 3], &mut f1, &cfg);
        let b = StateTest::wrap(vec![1, 2, 3], &mut f2, &cfg);
        assert_eq!(a.content_hash().unwrap(), b.content_hash().unwrap());
    }

    #[test]
    fn round_trips_through_json() {
        let cfg = FuzzConfig::default();
        let mut filler = Filler::new(vec![1, 2, 3, 4, 5, 6, 7, 8]);
        let test = StateTest::wrap(vec![0x60, 0x00], &mut filler, &cfg);
        let json = test.canonical_json().unwrap();
        let parsed: StateTest = serde_json::from_slice(&json).unwrap();
        assert_eq!(parsed, test);
    }

    #[test]
    fn artifact_name_embeds_its_own_content_hash() {
        let cfg = FuzzConfig::default();
        let mut filler = Filler::new(vec![4u8; 32]);
        let test = StateTest::wrap(vec![0x00], &mut filler, &cfg);
        let artifact = TestArtifact::from_test(&test).unwrap();
        assert_eq!(artifact.name, format!("fuzz-{}", artifact.content_hash));
        assert_eq!(artifact.json_bytes, test.canonical_json().unwrap());
    }
}
