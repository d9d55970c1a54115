//! # argentum-consensus
//!
//! Consensus rules for the Argentum blockchain.
//!
//! This crate provides:
//! - Block and header validation, including merge-mined (AuxPoW) proof of work
//! - The difficulty retargeting algorithm with the testnet minimum-difficulty rules
//! - The median-time-past timestamp rule and child-block verification
//! - Network parameter sets for mainnet, testnet and merge-mined chains
//!
//! ## Validation order
//!
//! [`validation::BlockValidator::check_block`] runs its checks in a fixed
//! order and fails with a [`VerificationError`] on the first violation:
//! header hash, proof of work (primary or auxiliary), timestamp sanity,
//! AuxPoW linkage, then the transaction set and its Merkle root.

pub mod chain_params;
mod difficulty;
mod error;
pub mod validation;

pub use chain_params::{
    NetworkConfig, NetworkParams, COIN, HALVING_INTERVAL, MAX_FUTURE_DRIFT_SECS,
    MEDIAN_TIME_SPAN,
};
pub use difficulty::{median_time_past, next_work_required, verify_child};
pub use error::{ConsensusError, ConsensusResult, VerificationError};
pub use validation::{BlockValidator, Clock, SystemClock};
