//! # argentum-types
//!
//! Core data model for the Argentum chain.
//!
//! This crate provides:
//! - Double-SHA-256 hashing and hash buffer utilities
//! - The compact difficulty codec (`bits` <-> 256-bit target) and the work metric
//! - The 80-byte block header model with lazy hash caching and chain-work accumulation
//! - Transactions, limited to the narrow contract consensus and mining consume
//! - The Merkle tree builder and branch verifier
//! - The auxiliary proof-of-work (AuxPoW) substructure for merge mining
//!
//! ## Byte order
//!
//! Hashes are carried in internal byte order (little-endian when read as a
//! 256-bit integer). Only two places use the reversed orientation: numeric
//! comparison against a difficulty target, and the hash embedded in a parent
//! chain's coinbase script. Display hex is reversed as well, matching the
//! conventional rendering.

pub mod auxpow;
pub mod block;
pub mod compact;
pub mod encode;
pub mod hash;
pub mod merkle;
pub mod tx;

pub use auxpow::{aux_branch_index, AuxPow, MERGED_MINING_TAG};
pub use block::{Block, HEADER_SIZE};
pub use compact::{decode_compact, decode_compact_signed, encode_compact, work_from_bits};
pub use hash::{
    double_sha256, hash_to_biguint, reverse_hash, to_reversed_hex, Hash256, ZERO_HASH,
};
pub use merkle::{branch_mask, merkle_branch, merkle_root, merkle_tree, verify_branch};
pub use tx::{OutPoint, Transaction, TxIn, TxOut, COINBASE_OUTPOINT};
