//! # argentum-mining
//!
//! Mining support for the Argentum blockchain.
//!
//! This crate provides:
//! - Block candidate preparation (coinbase, timestamp selection, next bits)
//! - The block subsidy schedule
//! - The external miner contract and a CPU reference solver

mod candidate;
mod coinbase;
mod error;
mod solver;

pub use candidate::CandidateGenerator;
pub use coinbase::{block_value, build_coinbase};
pub use error::{MiningError, MiningResult};
pub use solver::{CpuSolver, Solver};
