//! Error types for mining.

use argentum_consensus::ConsensusError;
use argentum_store::StoreError;
use thiserror::Error;

/// Mining failures.
#[derive(Error, Debug)]
pub enum MiningError {
    /// The solver was cancelled or exhausted its search space.
    #[error("mining cancelled before a solution was found")]
    Cancelled,

    /// Candidate preparation failed.
    #[error("candidate generation failed: {0}")]
    CandidateFailed(String),

    /// Consensus computation failed.
    #[error(transparent)]
    Consensus(#[from] ConsensusError),

    /// Store lookup failure, propagated unchanged.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Result type for mining operations.
pub type MiningResult<T> = Result<T, MiningError>;
