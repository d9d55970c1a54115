//! Error types for chain store lookups.

use thiserror::Error;

/// Store lookup failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// No block at the requested height.
    #[error("no block at height {0}")]
    NotFound(u32),

    /// The store holds no blocks at all.
    #[error("chain store is empty")]
    Empty,

    /// Underlying storage failure.
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
