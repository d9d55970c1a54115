//! Double-SHA-256 hashing and hash buffer utilities.

use num_bigint::BigUint;
use sha2::{Digest, Sha256};

/// A 32-byte hash in internal byte order.
pub type Hash256 = [u8; 32];

/// The all-zero hash.
pub const ZERO_HASH: Hash256 = [0u8; 32];

/// Compute `SHA256(SHA256(data))`.
pub fn double_sha256(data: &[u8]) -> Hash256 {
    let first = Sha256::digest(data);
    Sha256::digest(first).into()
}

/// Reverse a hash between internal and display byte order.
pub fn reverse_hash(hash: &Hash256) -> Hash256 {
    let mut out = *hash;
    out.reverse();
    out
}

/// Render a hash as hex in reversed (big-endian) orientation.
pub fn to_reversed_hex(hash: &Hash256) -> String {
    hex::encode(reverse_hash(hash))
}

/// Numeric value of an internal-order hash.
///
/// Proof-of-work compares this value against the decoded target; the
/// internal bytes are little-endian, so the reversed buffer read
/// big-endian yields the same integer.
pub fn hash_to_biguint(hash: &Hash256) -> BigUint {
    BigUint::from_bytes_be(&reverse_hash(hash))
}
