//! Block candidate preparation and the mine driver.

use crate::coinbase::build_coinbase;
use crate::error::{MiningError, MiningResult};
use crate::solver::Solver;
use argentum_consensus::{median_time_past, next_work_required, NetworkParams};
use argentum_store::ChainStore;
use argentum_types::{decode_compact, to_reversed_hex, Block, Transaction};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::info;

/// Prepares mineable block candidates on top of the current chain tip.
pub struct CandidateGenerator {
    params: NetworkParams,
}

impl CandidateGenerator {
    pub fn new(params: NetworkParams) -> Self {
        Self { params }
    }

    /// Draft the next block paying `beneficiary_script`.
    ///
    /// With no explicit `time`, the wall clock is used, floored to just
    /// past the median time so the draft always verifies. The returned
    /// draft stays mutable until a nonce is found; the transaction list
    /// holds the coinbase.
    pub async fn prepare_next_block(
        &self,
        chain: &dyn ChainStore,
        beneficiary_script: &[u8],
        time: Option<u32>,
    ) -> MiningResult<(Block, Vec<Transaction>)> {
        let top = chain.top_block().await?;
        let median = median_time_past(&top, chain).await?;
        let timestamp = match time {
            Some(explicit) => explicit,
            None => (median + 1).max(unix_time_secs()),
        };

        let coinbase = build_coinbase(top.height + 1, beneficiary_script);
        let mut draft = Block {
            version: 1,
            prev_hash: top.get_hash(),
            merkle_root: Block::calc_merkle_root(std::slice::from_ref(&coinbase)),
            timestamp,
            ..Block::default()
        };
        draft.bits = next_work_required(&top, &draft, chain, &self.params).await?;
        draft.attach_to(&top);

        info!(
            height = draft.height,
            bits = format!("{:#010x}", draft.bits),
            time = draft.timestamp,
            "prepared block candidate"
        );
        Ok((draft, vec![coinbase]))
    }

    /// Prepare a candidate and drive `solver` until it yields a nonce,
    /// then latch the block hash.
    pub async fn mine_next_block(
        &self,
        chain: &dyn ChainStore,
        beneficiary_script: &[u8],
        solver: &dyn Solver,
    ) -> MiningResult<(Block, Vec<Transaction>)> {
        let (mut block, txs) = self
            .prepare_next_block(chain, beneficiary_script, None)
            .await?;

        let target = decode_compact(block.bits);
        let nonce = solver
            .solve(&block.header(), &target)
            .await?
            .ok_or(MiningError::Cancelled)?;

        block.nonce = nonce;
        let hash = block.calc_hash();
        block.set_hash(hash);
        info!(
            height = block.height,
            nonce,
            hash = %to_reversed_hex(&hash),
            "mined block"
        );
        Ok((block, txs))
    }
}

fn unix_time_secs() -> u32 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs() as u32)
        .unwrap_or(0)
}
