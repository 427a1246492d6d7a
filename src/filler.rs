//! Deterministic typed reader over a finite byte seed.
//!
//! Grounded on `filler/fill.go` (MariusVanDerWijden/FuzzyVM): a cursor over
//! a byte seed that wraps modulo the seed length once exhausted, latching
//! `used_up` so callers can tell whether the seed ran dry.

use ethereum_types::U256;
use getset::Getters;

/// A cursor over a finite byte seed that turns it into an indefinite stream
/// of typed values. Every read advances the cursor by exactly the number of
/// bytes it consumes; no hidden alignment.
#[derive(Clone, Debug, Getters)]
pub struct Filler {
    data: Vec<u8>,
    pointer: usize,
    #[getset(get = "pub")]
    used_up: bool,
}

impl Filler {
    /// Creates a new `Filler` over `data`. An empty seed is replaced by a
    /// single zero byte, matching the Go source's `NewFiller`.
    pub fn new(data: impl Into<Vec<u8>>) -> Self {
        let mut data = data.into();
        if data.is_empty() {
            data.push(0);
        }
        Self {
            data,
            pointer: 0,
            used_up: false,
        }
    }

    /// Rewinds the cursor to the start without clearing `used_up` history
    /// other than what a fresh `Filler` would report.
    pub fn reset(&mut self) {
        self.pointer = 0;
        self.used_up = false;
    }

    pub fn used_up(&self) -> bool {
        self.used_up
    }

    fn inc_pointer(&mut self, i: usize) {
        if self.pointer + i >= self.data.len() {
            self.used_up = true;
        }
        self.pointer = (self.pointer + i) % self.data.len();
    }

    /// Reads the next byte, advancing the cursor by one.
    pub fn byte(&mut self) -> u8 {
        let b = self.data[self.pointer];
        self.inc_pointer(1);
        b
    }

    pub fn bool(&mut self) -> bool {
        self.byte() > 127
    }

    /// Reads `n` bytes, wrapping around the seed if it runs out.
    pub fn byte_slice(&mut self, n: usize) -> Vec<u8> {
        let mut out = vec![0u8; n];
        if n == 0 {
            return out;
        }
        if self.pointer + n < self.data.len() {
            let end = self.pointer + n;
            out.copy_from_slice(&self.data[self.pointer..end]);
        } else {
            let mut i = 0;
            while i < n {
                let avail = &self.data[self.pointer..];
                let take = avail.len().min(n - i);
                out[i..i + take].copy_from_slice(&avail[..take]);
                i += take;
                self.pointer = 0;
            }
            self.used_up = true;
        }
        self.inc_pointer(n);
        out
    }

    /// `byte_slice(byte())` — a length uniform over `0..=255`.
    pub fn byte_slice_256(&mut self) -> Vec<u8> {
        let n = self.byte() as usize;
        self.byte_slice(n)
    }

    pub fn uint16(&mut self) -> u16 {
        let b = self.byte_slice(2);
        u16::from_be_bytes([b[0], b[1]])
    }

    pub fn uint32(&mut self) -> u32 {
        let b = self.byte_slice(4);
        u32::from_be_bytes([b[0], b[1], b[2], b[3]])
    }

    pub fn uint64(&mut self) -> u64 {
        let b = self.byte_slice(8);
        let mut arr = [0u8; 8];
        arr.copy_from_slice(&b);
        u64::from_be_bytes(arr)
    }

    pub fn big_int_16(&mut self) -> U256 {
        U256::from(self.uint16())
    }

    pub fn big_int_32(&mut self) -> U256 {
        U256::from(self.uint32())
    }

    pub fn big_int_64(&mut self) -> U256 {
        U256::from_big_endian(&self.byte_slice(8))
    }

    pub fn big_int_256(&mut self) -> U256 {
        U256::from_big_endian(&self.byte_slice(32))
    }

    /// A gas value. With probability 253/255 it's `BigInt32 mod 20_000_000`;
    /// the sentinel bytes 253/254/255 instead draw a 32/64/256-bit integer.
    pub fn gas_int(&mut self) -> U256 {
        let b = self.byte();
        match b {
            253 => self.big_int_32(),
            254 => self.big_int_64(),
            255 => self.big_int_256(),
            _ => self.big_int_32() % U256::from(20_000_000u64),
        }
    }

    /// A memory/offset value, biased toward small values so generated
    /// programs usually stay within gas-reachable memory.
    pub fn mem_int(&mut self) -> U256 {
        let b = self.byte();
        match b {
            253 => self.big_int_32(),
            254 => self.big_int_64(),
            255 => self.big_int_256(),
            _ => U256::from(self.byte()),
        }
    }

    /// A small non-negative int in `0..256`, used for recursive size
    /// bookkeeping (sub-container / child-program counts).
    pub fn small_int(&mut self) -> usize {
        self.byte() as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_seed_becomes_one_zero_byte() {
        let mut f = Filler::new(vec![]);
        assert_eq!(f.byte(), 0);
    }

    #[test]
    fn determinism() {
        let seed = b"some arbitrary seed bytes for replay".to_vec();
        let run = |s: Vec<u8>| {
            let mut f = Filler::new(s);
            (
                f.uint32(),
                f.byte_slice(5),
                f.gas_int(),
                f.mem_int(),
                f.used_up(),
            )
        };
        assert_eq!(run(seed.clone()), run(seed));
    }

    #[test]
    fn wrap_exact_length() {
        let seed = vec![1u8, 2, 3, 4];
        let mut f = Filler::new(seed.clone());
        // Consuming exactly len(seed) bytes must not latch used_up, since
        // the last byte read is the final in-bounds byte.
        let _ = f.byte_slice(3);
        assert!(!f.used_up());
        let _ = f.byte();
        assert!(f.used_up());
    }

    #[test]
    fn wrap_is_cyclic_past_exhaustion() {
        let seed = vec![0xAA, 0xBB];
        let mut f = Filler::new(seed);
        let out = f.byte_slice(5);
        assert_eq!(out, vec![0xAA, 0xBB, 0xAA, 0xBB, 0xAA]);
        assert!(f.used_up());
    }

    #[test]
    fn big_endian_uint32() {
        let mut f = Filler::new(vec![0x00, 0x00, 0x01, 0x00, 0, 0, 0, 0]);
        assert_eq!(f.uint32(), 256);
    }

    #[test]
    fn reset_clears_used_up() {
        let mut f = Filler::new(vec![1, 2]);
        let _ = f.byte_slice(10);
        assert!(f.used_up());
        f.reset();
        assert!(!f.used_up());
    }

    #[test]
    fn byte_slice_256_length_uniform() {
        let mut f = Filler::new(vec![5, 1, 2, 3, 4, 5]);
        let s = f.byte_slice_256();
        assert_eq!(s.len(), 5);
    }
}
