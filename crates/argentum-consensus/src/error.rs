//! Error types for consensus validation.

use argentum_store::StoreError;
use thiserror::Error;

/// A consensus-rule violation.
///
/// The variant is the machine tag; the rendered message carries the
/// human-readable reason.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VerificationError {
    /// The recorded block hash is absent or does not match the header.
    #[error("block hash check failed: {0}")]
    BadHash(String),

    /// The proof-of-work hash does not meet the difficulty target.
    #[error("proof of work does not meet target: {0}")]
    PowBelowTarget(String),

    /// A merge-mined block claims a foreign aux chain id.
    #[error("aux proof of work is for another chain: {0}")]
    PowWrongAuxChain(String),

    /// The block timestamp is beyond the tolerated clock drift.
    #[error("timestamp too far in the future: block {block_time}, limit {limit}")]
    TimestampTooFarFuture { block_time: u32, limit: u64 },

    /// The block carries an empty transaction set.
    #[error("block has no transactions")]
    NoTransactions,

    /// The first transaction is not a coinbase.
    #[error("first transaction is not a coinbase")]
    FirstTxNotCoinbase,

    /// A transaction other than the first is a coinbase.
    #[error("transaction {index} is a coinbase")]
    NonFirstTxIsCoinbase { index: usize },

    /// The header carries no Merkle root to check against.
    #[error("block has no merkle root")]
    NoMerkleRoot,

    /// The transaction set does not hash to the header Merkle root.
    #[error("merkle root mismatch: computed {computed}, header {header}")]
    MerkleRootMismatch { computed: String, header: String },

    /// The aux coinbase does not prove into the parent Merkle root.
    #[error("aux coinbase does not link to the parent merkle root")]
    AuxPowMerkleLink,

    /// The expected hash is absent from the parent coinbase script.
    #[error("aux block hash not found in the parent coinbase script")]
    AuxPowHashNotInScript,

    /// The merged-mining tag appears more than once.
    #[error("merged mining header duplicated in the parent coinbase script")]
    AuxPowHeaderDuplicated,

    /// The embedded hash does not directly follow the merged-mining tag.
    #[error("aux block hash does not follow the merged mining header")]
    AuxPowHashNotAfterHeader,

    /// Tagless legacy script with the hash beyond the allowed window.
    #[error("aux block hash too deep in a legacy parent coinbase script: offset {offset}")]
    AuxPowLegacyOffset { offset: usize },

    /// The committed aggregation size does not match the branch length.
    #[error("aux merkle size mismatch: {0}")]
    AuxPowSizeMismatch(String),

    /// The branch mask is not the slot derived for this chain.
    #[error("aux merkle mask mismatch: branch {branch_mask}, expected {expected}")]
    AuxPowMaskMismatch { branch_mask: u32, expected: u32 },

    /// The block difficulty differs from the required next work.
    #[error("wrong difficulty: block {got:#010x}, required {required:#010x}")]
    WrongDifficulty { got: u32, required: u32 },

    /// The block timestamp is not past the median time of its ancestors.
    #[error("timestamp not past median: block {block_time}, median {median}")]
    TimestampTooEarly { block_time: u32, median: u32 },
}

/// Failures surfaced by consensus operations.
#[derive(Error, Debug)]
pub enum ConsensusError {
    /// A consensus-rule violation.
    #[error(transparent)]
    Verification(#[from] VerificationError),

    /// Store lookup failure, propagated unchanged.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Result type for consensus operations.
pub type ConsensusResult<T> = Result<T, ConsensusError>;
