//! Transactions.
//!
//! The consensus core consumes transactions through a narrow contract:
//! hashing, coinbase classification, serialized size, and access to the
//! first input script for merge-mining proofs. Script execution and
//! signature checking live elsewhere.

use crate::encode::{push_u32_le, push_u64_le, push_varint, varint_len};
use crate::hash::{double_sha256, Hash256, ZERO_HASH};

/// Reference to an output of a previous transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutPoint {
    /// Hash of the referenced transaction, internal byte order.
    pub hash: Hash256,
    /// Output index within that transaction.
    pub index: u32,
}

/// The reserved outpoint spent by coinbase inputs.
pub const COINBASE_OUTPOINT: OutPoint = OutPoint {
    hash: ZERO_HASH,
    index: 0xffff_ffff,
};

/// Transaction input.
#[derive(Debug, Clone)]
pub struct TxIn {
    pub prev_out: OutPoint,
    pub script: Vec<u8>,
    pub sequence: u32,
}

/// Transaction output.
#[derive(Debug, Clone)]
pub struct TxOut {
    /// Value in base units.
    pub value: u64,
    pub script: Vec<u8>,
}

/// A transaction.
#[derive(Debug, Clone)]
pub struct Transaction {
    pub version: u32,
    pub ins: Vec<TxIn>,
    pub outs: Vec<TxOut>,
    pub lock_time: u32,
}

impl Transaction {
    /// Serialize to the wire form used for hashing.
    pub fn serialize(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.serialized_size());
        push_u32_le(&mut buf, self.version);
        push_varint(&mut buf, self.ins.len() as u64);
        for input in &self.ins {
            buf.extend_from_slice(&input.prev_out.hash);
            push_u32_le(&mut buf, input.prev_out.index);
            push_varint(&mut buf, input.script.len() as u64);
            buf.extend_from_slice(&input.script);
            push_u32_le(&mut buf, input.sequence);
        }
        push_varint(&mut buf, self.outs.len() as u64);
        for output in &self.outs {
            push_u64_le(&mut buf, output.value);
            push_varint(&mut buf, output.script.len() as u64);
            buf.extend_from_slice(&output.script);
        }
        push_u32_le(&mut buf, self.lock_time);
        buf
    }

    /// Transaction hash, internal byte order.
    pub fn get_hash(&self) -> Hash256 {
        double_sha256(&self.serialize())
    }

    /// A coinbase spends only the reserved outpoint.
    pub fn is_coinbase(&self) -> bool {
        self.ins.len() == 1 && self.ins[0].prev_out == COINBASE_OUTPOINT
    }

    /// Serialized length in bytes.
    pub fn serialized_size(&self) -> usize {
        let ins: usize = self
            .ins
            .iter()
            .map(|i| 36 + varint_len(i.script.len() as u64) + i.script.len() + 4)
            .sum();
        let outs: usize = self
            .outs
            .iter()
            .map(|o| 8 + varint_len(o.script.len() as u64) + o.script.len())
            .sum();
        4 + varint_len(self.ins.len() as u64)
            + ins
            + varint_len(self.outs.len() as u64)
            + outs
            + 4
    }

    /// Script of the first input, if any. AuxPoW validation scans this
    /// for the merged-mining commitment.
    pub fn first_input_script(&self) -> Option<&[u8]> {
        self.ins.first().map(|input| input.script.as_slice())
    }
}
