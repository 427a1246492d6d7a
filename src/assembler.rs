//! Opcode-level program assembler.
//!
//! Grounded on `util::bytecode::Bytecode`'s stack-ordering conventions (pushes
//! happen in EVM operand order, last push sits on top), reworked from a
//! consuming builder into a mutable one: strategies need to read back the
//! current program counter mid-emission to record jump candidates and
//! pending sites, which a `self -> Self` builder can't do without returning
//! the position alongside itself at every step.

use crate::opcode::OpCode;
use ethereum_types::U256;

/// An ordered, append-only byte buffer under construction. The "label
/// counter" mentioned in the data model is just `self.code.len()`; there is
/// no separate field to keep in sync.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Program {
    code: Vec<u8>,
}

impl Program {
    pub fn new() -> Self {
        Self { code: Vec::new() }
    }

    /// Current program counter: the position the next emitted byte will
    /// occupy.
    pub fn pc(&self) -> usize {
        self.code.len()
    }

    pub fn len(&self) -> usize {
        self.code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }

    /// Consumes the assembler, returning the finished bytecode.
    pub fn bytes(self) -> Vec<u8> {
        self.code
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.code
    }

    /// Emits a bare opcode byte with no immediate.
    pub fn op(&mut self, opcode: OpCode) -> &mut Self {
        self.code.push(opcode.to_u8());
        self
    }

    /// Emits a raw opcode byte regardless of whether it decodes to a named
    /// opcode. Undefined bytes are exactly the interesting case for a
    /// differential fuzzer, so this does not gate on `OpCode::from_u8`.
    pub fn op_byte(&mut self, byte: u8) -> &mut Self {
        self.code.push(byte);
        self
    }

    /// Emits the minimal-width `PUSHn` for `value`: leading zero bytes are
    /// trimmed, but at least one immediate byte is always emitted (so
    /// pushing zero costs `PUSH1 0x00`, never `PUSH0`+`0x00`).
    pub fn push(&mut self, value: impl Into<U256>) -> &mut Self {
        let value = value.into();
        let be = <[u8; 32]>::from(value);
        let trimmed: Vec<u8> = be.iter().skip_while(|&&b| b == 0).copied().collect();
        self.push_bytes(&trimmed)
    }

    /// Emits `PUSHn` for a raw byte string, trimming no leading zeros
    /// (unlike [`push`]): `n` is exactly `bytes.len().max(1)`.
    pub fn push_bytes(&mut self, bytes: &[u8]) -> &mut Self {
        let b: &[u8] = if bytes.is_empty() { &[0] } else { bytes };
        debug_assert!(b.len() <= 32, "push immediate wider than 32 bytes");
        self.code.push(crate::opcode::push_n(b.len() as u8).to_u8());
        self.code.extend_from_slice(b);
        self
    }

    /// Emits a fixed-width `PUSH8` with an 8-byte big-endian immediate,
    /// regardless of leading zeros. Used for deferred jump sites, whose
    /// sentinel the jump resolver locates by scanning for a run of eight
    /// `0xFF` bytes of known width.
    pub fn push8_fixed(&mut self, value: u64) -> &mut Self {
        self.code.push(OpCode::PUSH8.to_u8());
        self.code.extend_from_slice(&value.to_be_bytes());
        self
    }

    pub fn push0(&mut self) -> &mut Self {
        self.op(OpCode::PUSH0)
    }

    /// `MSTORE(offset, value)` where `value` is interpreted as the minimal
    /// big-endian encoding of `bytes` (matching the canonical scenario:
    /// `mstore(hex"ff", 7_000_000)` emits `PUSH1 0xff PUSH3 <..> MSTORE`).
    pub fn mstore(&mut self, bytes: impl Into<U256>, offset: impl Into<U256>) -> &mut Self {
        self.push(bytes);
        self.push(offset);
        self.op(OpCode::MSTORE)
    }

    /// `MSTORE8(offset, value)`.
    pub fn mstore_small(&mut self, bytes: impl Into<U256>, offset: impl Into<U256>) -> &mut Self {
        self.push(bytes);
        self.push(offset);
        self.op(OpCode::MSTORE8)
    }

    /// Writes an arbitrary-length byte string into memory starting at
    /// `offset`, one word at a time. Used by [`create_and_call`] and by
    /// precompile callers to lay a synthesised payload into memory before
    /// calling out to it.
    ///
    /// [`create_and_call`]: Self::create_and_call
    pub fn mstore_bytes(&mut self, data: &[u8], offset: usize) -> &mut Self {
        for (i, chunk) in data.chunks(32).enumerate() {
            let mut word = [0u8; 32];
            word[..chunk.len()].copy_from_slice(chunk);
            self.push(U256::from_big_endian(&word));
            self.push(U256::from(offset + i * 32));
            self.op(OpCode::MSTORE);
        }
        self
    }

    pub fn sstore(&mut self, slot: impl Into<U256>, value: impl Into<U256>) -> &mut Self {
        self.push(value);
        self.push(slot);
        self.op(OpCode::SSTORE)
    }

    pub fn sload(&mut self, slot: impl Into<U256>) -> &mut Self {
        self.push(slot);
        self.op(OpCode::SLOAD)
    }

    pub fn tstore(&mut self, slot: impl Into<U256>, value: impl Into<U256>) -> &mut Self {
        self.push(value);
        self.push(slot);
        self.op(OpCode::TSTORE)
    }

    pub fn tload(&mut self, slot: impl Into<U256>) -> &mut Self {
        self.push(slot);
        self.op(OpCode::TLOAD)
    }

    /// Copies `mem_size` bytes from memory at `mem_start` into consecutive
    /// storage slots starting at `slot_start`, one 32-byte word per slot.
    /// Unrolled at assembly time: all three arguments are known when the
    /// program is built, not runtime stack values.
    pub fn mem_to_storage(&mut self, mem_start: usize, mem_size: usize, slot_start: usize) -> &mut Self {
        let words = mem_size.div_ceil(32);
        for i in 0..words {
            self.push(U256::from(mem_start + i * 32));
            self.op(OpCode::MLOAD);
            self.push(U256::from(slot_start + i));
            self.op(OpCode::SSTORE);
        }
        self
    }

    pub fn return_(&mut self, offset: impl Into<U256>, len: impl Into<U256>) -> &mut Self {
        self.push(len);
        self.push(offset);
        self.op(OpCode::RETURN)
    }

    /// Lays `data` into memory starting at offset 0, then returns it.
    pub fn return_data(&mut self, data: &[u8]) -> &mut Self {
        self.mstore_bytes(data, 0);
        self.return_(U256::zero(), U256::from(data.len()))
    }

    pub fn jumpdest(&mut self) -> usize {
        let here = self.pc();
        self.op(OpCode::JUMPDEST);
        here
    }

    /// Records the current position without emitting anything.
    pub fn label(&mut self) -> usize {
        self.pc()
    }

    pub fn jump(&mut self, dest: impl Into<U256>) -> &mut Self {
        self.push(dest);
        self.op(OpCode::JUMP)
    }

    /// `condition` is pushed first, `dest` second, so `dest` sits on top of
    /// the stack (popped first by `JUMPI`, matching its spec operand order).
    pub fn jump_if(&mut self, dest: impl Into<U256>, condition: impl Into<U256>) -> &mut Self {
        self.push(condition);
        self.push(dest);
        self.op(OpCode::JUMPI)
    }

    /// Emits a deferred jump: pushes the jumptable's sentinel as a
    /// fixed-width `PUSH8` immediate and emits `JUMP`. The resolver patches
    /// the sentinel bytes in a post-pass; see [`crate::jumptable::Jumptable`].
    pub fn jump_deferred(&mut self, jt: &mut crate::jumptable::Jumptable) -> &mut Self {
        let site = self.pc();
        let sentinel = jt.pop(site);
        self.push8_fixed(sentinel);
        self.op(OpCode::JUMP)
    }

    pub fn call(&mut self, call: Call) -> &mut Self {
        self.emit_call(call)
    }

    fn emit_call(&mut self, call: Call) -> &mut Self {
        self.push(call.out_size);
        self.push(call.out_offset);
        self.push(call.in_size);
        self.push(call.in_offset);
        if matches!(call.op, OpCode::CALL | OpCode::CALLCODE) {
            self.push(call.value);
        }
        self.push(call.address);
        self.push(call.gas);
        self.op(call.op)
    }

    pub fn create(&mut self, value: impl Into<U256>, offset: impl Into<U256>, size: impl Into<U256>) -> &mut Self {
        self.push(size);
        self.push(offset);
        self.push(value);
        self.op(OpCode::CREATE)
    }

    pub fn create2(
        &mut self,
        value: impl Into<U256>,
        offset: impl Into<U256>,
        size: impl Into<U256>,
        salt: impl Into<U256>,
    ) -> &mut Self {
        self.push(salt);
        self.push(size);
        self.push(offset);
        self.push(value);
        self.op(OpCode::CREATE2)
    }

    /// Lays `code` into memory, creates a child contract from it, then
    /// immediately calls the freshly created address with `call_opcode`,
    /// reusing the address `CREATE`/`CREATE2` left on the stack via `DUPn`
    /// rather than pushing it again as a literal.
    pub fn create_and_call(&mut self, code: &[u8], is_create2: bool, call_opcode: OpCode) -> &mut Self {
        self.mstore_bytes(code, 0);
        if is_create2 {
            self.create2(U256::zero(), U256::zero(), U256::from(code.len()), U256::zero());
        } else {
            self.create(U256::zero(), U256::zero(), U256::from(code.len()));
        }
        // stack: [addr]
        self.push(U256::zero()); // ret size
        self.push(U256::zero()); // ret offset
        self.push(U256::zero()); // args size
        self.push(U256::zero()); // args offset
        if matches!(call_opcode, OpCode::CALL | OpCode::CALLCODE) {
            self.push(U256::zero()); // value
            self.op(OpCode::DUP7);
        } else {
            self.op(OpCode::DUP6);
        }
        self.push(U256::from(0xffffu64)); // generous flat gas stipend
        self.op(call_opcode)
    }
}

/// Parameters for a `CALL`/`CALLCODE`/`DELEGATECALL`/`STATICCALL` emission.
/// `value` is ignored for the two opcodes that don't carry one.
pub struct Call {
    pub op: OpCode,
    pub gas: U256,
    pub address: U256,
    pub value: U256,
    pub in_offset: U256,
    pub in_size: U256,
    pub out_offset: U256,
    pub out_size: U256,
}

impl Call {
    fn new(op: OpCode, address: impl Into<U256>) -> Self {
        Self {
            op,
            gas: U256::zero(),
            address: address.into(),
            value: U256::zero(),
            in_offset: U256::zero(),
            in_size: U256::zero(),
            out_offset: U256::zero(),
            out_size: U256::zero(),
        }
    }

    pub fn call(address: impl Into<U256>) -> Self {
        Self::new(OpCode::CALL, address)
    }

    pub fn call_code(address: impl Into<U256>) -> Self {
        Self::new(OpCode::CALLCODE, address)
    }

    pub fn static_call(address: impl Into<U256>) -> Self {
        Self::new(OpCode::STATICCALL, address)
    }

    pub fn delegate_call(address: impl Into<U256>) -> Self {
        Self::new(OpCode::DELEGATECALL, address)
    }

    pub fn gas(mut self, gas: impl Into<U256>) -> Self {
        self.gas = gas.into();
        self
    }

    pub fn value(mut self, value: impl Into<U256>) -> Self {
        self.value = value.into();
        self
    }

    pub fn input(mut self, offset: impl Into<U256>, size: impl Into<U256>) -> Self {
        self.in_offset = offset.into();
        self.in_size = size.into();
        self
    }

    pub fn output(mut self, offset: impl Into<U256>, size: impl Into<U256>) -> Self {
        self.out_offset = offset.into();
        self.out_size = size.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_mstore_gas_jumpdest_mload_jump_scenario() {
        let mut p = Program::new();
        p.mstore(U256::from(0xffu8), U256::from(7_000_000u32));
        p.op(OpCode::GAS);
        let dest = p.jumpdest();
        p.op(OpCode::MLOAD);
        p.jump(U256::from(dest));

        let expected: Vec<u8> = {
            let mut v = vec![OpCode::PUSH1.to_u8(), 0xff];
            v.extend_from_slice(&[OpCode::PUSH3.to_u8(), 0x6a, 0xcf, 0xc0]);
            v.push(OpCode::MSTORE.to_u8());
            v.push(OpCode::GAS.to_u8());
            v.push(OpCode::JUMPDEST.to_u8());
            v.push(OpCode::MLOAD.to_u8());
            v.push(OpCode::PUSH1.to_u8());
            v.push(dest as u8);
            v.push(OpCode::JUMP.to_u8());
            v
        };
        assert_eq!(p.bytes(), expected);
    }

    #[test]
    fn every_push_immediate_matches_its_declared_width() {
        let mut p = Program::new();
        p.push(U256::from(1u8));
        p.push(U256::from(300u32));
        p.push(U256::from(u64::MAX));
        p.push0();
        p.op(OpCode::ADD);

        let code = p.bytes();
        let mut i = 0;
        while i < code.len() {
            let op = OpCode::from_u8(code[i]).expect("defined opcode");
            match op.push_size() {
                Some(n) => {
                    assert!(i + 1 + n as usize <= code.len(), "immediate runs past end of code");
                    i += 1 + n as usize;
                }
                None => i += 1,
            }
        }
    }

    #[test]
    fn jumpdest_returns_its_own_position() {
        let mut p = Program::new();
        p.op(OpCode::STOP);
        let pc = p.jumpdest();
        assert_eq!(pc, 1);
        assert_eq!(p.as_bytes()[pc], OpCode::JUMPDEST.to_u8());
    }

    #[test]
    fn label_emits_nothing() {
        let mut p = Program::new();
        p.op(OpCode::STOP);
        let before = p.pc();
        let label = p.label();
        assert_eq!(label, before);
        assert_eq!(p.pc(), before);
    }

    #[test]
    fn call_stack_ordering_puts_gas_last() {
        let mut p = Program::new();
        p.call(
            Call::call(U256::from(0x42u8))
                .gas(U256::from(100u32))
                .value(U256::from(1u8))
                .input(U256::zero(), U256::from(4u8))
                .output(U256::zero(), U256::from(32u8)),
        );
        let code = p.bytes();
        assert_eq!(*code.last().unwrap(), OpCode::CALL.to_u8());
        // The immediately preceding push is the gas value (100 = 0x64).
        assert_eq!(code[code.len() - 2], 0x64);
    }
}
