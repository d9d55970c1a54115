//! The miner contract and a CPU reference solver.
//!
//! A solver receives an 80-byte header and the decoded target and
//! returns a nonce whose header hash meets the target, or `None` when
//! cancelled. Long-running searches must honour the cancel signal and
//! return promptly.

use crate::error::MiningResult;
use argentum_types::{double_sha256, hash_to_biguint, HEADER_SIZE};
use async_trait::async_trait;
use num_bigint::BigUint;
use rand::Rng;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, trace};

/// Nonce attempts between cancellation checks.
const DEFAULT_BATCH_SIZE: u32 = 10_000;

/// External miner contract.
#[async_trait]
pub trait Solver: Send + Sync {
    /// Search for a nonce whose header hash meets `target`. `Ok(None)`
    /// means the search was cancelled or the nonce space is exhausted.
    async fn solve(&self, header: &[u8; HEADER_SIZE], target: &BigUint)
        -> MiningResult<Option<u32>>;
}

/// CPU reference solver.
///
/// Scans the 32-bit nonce space in batches from a random starting
/// point, checking the cancel flag and yielding to the runtime between
/// batches. Intended for testnets and development.
pub struct CpuSolver {
    cancel: Arc<AtomicBool>,
    hash_count: AtomicU64,
    batch_size: u32,
}

impl Default for CpuSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl CpuSolver {
    pub fn new() -> Self {
        Self::with_batch_size(DEFAULT_BATCH_SIZE)
    }

    pub fn with_batch_size(batch_size: u32) -> Self {
        Self {
            cancel: Arc::new(AtomicBool::new(false)),
            hash_count: AtomicU64::new(0),
            batch_size: batch_size.max(1),
        }
    }

    /// Handle for cancelling an in-flight solve.
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        self.cancel.clone()
    }

    /// Hashes attempted so far, for rate tracking.
    pub fn hashes(&self) -> u64 {
        self.hash_count.load(Ordering::Relaxed)
    }

    fn try_batch(
        &self,
        header: &mut [u8; HEADER_SIZE],
        target: &BigUint,
        start: u32,
        len: u32,
    ) -> Option<u32> {
        for offset in 0..len {
            let nonce = start.wrapping_add(offset);
            header[76..80].copy_from_slice(&nonce.to_le_bytes());
            let hash = double_sha256(header);
            if hash_to_biguint(&hash) <= *target {
                self.hash_count.fetch_add(u64::from(offset) + 1, Ordering::Relaxed);
                return Some(nonce);
            }
        }
        self.hash_count.fetch_add(u64::from(len), Ordering::Relaxed);
        None
    }
}

#[async_trait]
impl Solver for CpuSolver {
    async fn solve(
        &self,
        header: &[u8; HEADER_SIZE],
        target: &BigUint,
    ) -> MiningResult<Option<u32>> {
        let mut header = *header;
        let start: u32 = rand::thread_rng().gen();
        let nonce_space = u64::from(u32::MAX) + 1;

        let mut attempted: u64 = 0;
        while attempted < nonce_space {
            if self.cancel.load(Ordering::Relaxed) {
                trace!(attempted, "solve cancelled");
                return Ok(None);
            }
            let batch_start = start.wrapping_add(attempted as u32);
            let len = u64::from(self.batch_size).min(nonce_space - attempted) as u32;
            if let Some(nonce) = self.try_batch(&mut header, target, batch_start, len) {
                debug!(nonce, "found nonce");
                return Ok(Some(nonce));
            }
            attempted += u64::from(len);
            tokio::task::yield_now().await;
        }
        trace!("nonce space exhausted");
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use argentum_types::Block;
    use num_bigint::BigUint;

    fn any_header() -> [u8; HEADER_SIZE] {
        Block {
            version: 1,
            timestamp: 1_500_000,
            bits: 0x207fffff,
            ..Block::default()
        }
        .header()
    }

    #[tokio::test]
    async fn trivial_target_solves_immediately() {
        let solver = CpuSolver::with_batch_size(16);
        let everything = (BigUint::from(1u8) << 256u16) - 1u8;
        let nonce = solver
            .solve(&any_header(), &everything)
            .await
            .unwrap()
            .expect("any nonce meets an all-ones target");

        // The returned nonce really does hash under the target.
        let mut header = any_header();
        header[76..80].copy_from_slice(&nonce.to_le_bytes());
        assert!(hash_to_biguint(&double_sha256(&header)) <= everything);
        assert!(solver.hashes() >= 1);
    }

    #[tokio::test]
    async fn cancelled_solver_returns_none() {
        let solver = CpuSolver::new();
        solver.cancel_flag().store(true, Ordering::Relaxed);
        // Target zero would search forever if cancellation were ignored.
        let unreachable = BigUint::from(0u8);
        let found = solver.solve(&any_header(), &unreachable).await.unwrap();
        assert!(found.is_none());
    }
}
