//! Block header model and chain attachment.
//!
//! A block is immutable once built, apart from the lazily computed hash
//! cache and the chain-attachment fields (`height`, `chain_work`) set by
//! [`Block::attach_to`]. Candidates coming out of the miner stay mutable
//! until a nonce is found and the hash is latched.

use crate::auxpow::AuxPow;
use crate::compact::work_from_bits;
use crate::encode::{push_u32_le, read_u32_le, varint_len};
use crate::hash::{double_sha256, to_reversed_hex, Hash256};
use crate::merkle::{merkle_root, merkle_tree};
use crate::tx::Transaction;
use num_bigint::BigUint;
use serde_json::{json, Value};
use std::sync::OnceLock;

/// Serialized header length in bytes.
pub const HEADER_SIZE: usize = 80;

/// A block of the Argentum chain.
///
/// On an alternative chain, the high 16 bits of `version` carry the aux
/// chain id and a version bit flags merge-mined proof-of-work, in which
/// case `aux` holds the auxiliary proof.
#[derive(Debug, Clone, Default)]
pub struct Block {
    pub version: u32,
    /// Parent header hash, internal byte order.
    pub prev_hash: Hash256,
    /// Root over the block's transactions.
    pub merkle_root: Hash256,
    /// Seconds since the epoch.
    pub timestamp: u32,
    /// Compact difficulty target.
    pub bits: u32,
    pub nonce: u32,
    /// Height on the chain; genesis is 0. Set by [`Block::attach_to`].
    pub height: u32,
    /// Cumulative work up to and including this block.
    pub chain_work: BigUint,
    /// Transactions, absent for header-only blocks.
    pub txs: Option<Vec<Transaction>>,
    /// Auxiliary proof-of-work for merge-mined blocks.
    pub aux: Option<Box<AuxPow>>,
    /// Cached header hash. Written at most once; double computation
    /// yields identical bytes, so no lock is needed.
    pub hash: OnceLock<Hash256>,
}

impl Block {
    /// Parse the fixed 80-byte header.
    pub fn from_header(header: &[u8; HEADER_SIZE]) -> Self {
        let word = |at: usize| read_u32_le(&header[at..]).expect("fixed-size header");
        let mut prev_hash = [0u8; 32];
        prev_hash.copy_from_slice(&header[4..36]);
        let mut merkle_root = [0u8; 32];
        merkle_root.copy_from_slice(&header[36..68]);
        Self {
            version: word(0),
            prev_hash,
            merkle_root,
            timestamp: word(68),
            bits: word(72),
            nonce: word(76),
            ..Self::default()
        }
    }

    /// Serialize the 80-byte header: each integer little-endian, hashes
    /// in internal order.
    pub fn header(&self) -> [u8; HEADER_SIZE] {
        let mut buf = Vec::with_capacity(HEADER_SIZE);
        push_u32_le(&mut buf, self.version);
        buf.extend_from_slice(&self.prev_hash);
        buf.extend_from_slice(&self.merkle_root);
        push_u32_le(&mut buf, self.timestamp);
        push_u32_le(&mut buf, self.bits);
        push_u32_le(&mut buf, self.nonce);
        buf.try_into().expect("header is exactly 80 bytes")
    }

    /// Hash the current header fields.
    pub fn calc_hash(&self) -> Hash256 {
        double_sha256(&self.header())
    }

    /// Cached header hash, computing and latching it on first use.
    pub fn get_hash(&self) -> Hash256 {
        *self.hash.get_or_init(|| self.calc_hash())
    }

    /// Cached header hash, if one has been recorded.
    pub fn cached_hash(&self) -> Option<Hash256> {
        self.hash.get().copied()
    }

    /// Record the header hash. Idempotent; a hash already present wins.
    pub fn set_hash(&self, hash: Hash256) {
        let _ = self.hash.set(hash);
    }

    /// Whether the recorded hash matches the header. A block without a
    /// recorded hash fails; this never recomputes into the cache.
    pub fn check_hash(&self) -> bool {
        match self.cached_hash() {
            Some(stored) => stored == self.calc_hash(),
            None => false,
        }
    }

    /// Expected work for this block's difficulty.
    pub fn work(&self) -> BigUint {
        work_from_bits(self.bits)
    }

    /// Attach below `parent`: the height advances by one and the parent's
    /// cumulative work grows by this block's.
    pub fn attach_to(&mut self, parent: &Block) {
        self.height = parent.height + 1;
        self.chain_work = &parent.chain_work + self.work();
    }

    /// Fork choice: more cumulative work wins.
    pub fn has_more_work_than(&self, other: &Block) -> bool {
        self.chain_work > other.chain_work
    }

    /// Merkle root over a transaction set.
    pub fn calc_merkle_root(txs: &[Transaction]) -> Hash256 {
        let hashes: Vec<Hash256> = txs.iter().map(Transaction::get_hash).collect();
        merkle_root(&hashes)
    }

    /// Display projection with canonical field names. All hashes render
    /// in reversed hex; transaction details appear when txs are attached.
    pub fn standardized_object(&self) -> Value {
        let mut obj = json!({
            "hash": to_reversed_hex(&self.get_hash()),
            "version": self.version,
            "prev_block": to_reversed_hex(&self.prev_hash),
            "mrkl_root": to_reversed_hex(&self.merkle_root),
            "time": self.timestamp,
            "bits": self.bits,
            "nonce": self.nonce,
            "height": self.height,
        });
        if let Some(txs) = &self.txs {
            let size: usize = HEADER_SIZE
                + varint_len(txs.len() as u64)
                + txs.iter().map(Transaction::serialized_size).sum::<usize>();
            let hashes: Vec<Hash256> = txs.iter().map(Transaction::get_hash).collect();
            obj["n_tx"] = json!(txs.len());
            obj["size"] = json!(size);
            obj["tx"] = json!(txs
                .iter()
                .map(|tx| json!({
                    "hash": to_reversed_hex(&tx.get_hash()),
                    "size": tx.serialized_size(),
                }))
                .collect::<Vec<_>>());
            obj["mrkl_tree"] = json!(merkle_tree(&hashes)
                .iter()
                .map(to_reversed_hex)
                .collect::<Vec<_>>());
        }
        obj
    }
}
