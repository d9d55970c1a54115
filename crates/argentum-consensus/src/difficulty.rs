//! Difficulty retargeting and block time rules.
//!
//! The retarget runs once per interval (`target_timespan /
//! target_spacing` blocks) and rescales the previous target by the
//! actual time the window took, clamped to a factor of four either way
//! and never easier than the pow limit. Off-boundary blocks inherit the
//! previous difficulty, except on testnet where a block arriving more
//! than two spacings late may drop to minimum difficulty.
//!
//! Store lookups are awaited one at a time; the first store error aborts
//! the operation. The testnet walk-back iterates rather than recurses,
//! bounded by the interval length.

use crate::chain_params::{NetworkParams, MEDIAN_TIME_SPAN};
use crate::error::{ConsensusResult, VerificationError};
use argentum_store::{ChainStore, StoreError};
use argentum_types::{decode_compact_signed, encode_compact, Block};
use num_bigint::BigInt;
use num_traits::Zero;
use tracing::debug;

/// Compact difficulty required for `next`, extending the chain at `prev`.
pub async fn next_work_required(
    prev: &Block,
    next: &Block,
    chain: &dyn ChainStore,
    params: &NetworkParams,
) -> ConsensusResult<u32> {
    let interval = params.interval();

    if prev.height == 0 {
        return Ok(prev.bits);
    }

    if (prev.height + 1) % interval != 0 {
        if !params.testnet {
            return Ok(prev.bits);
        }
        return testnet_work_required(prev, next, chain, params).await;
    }

    // Retarget boundary. The anchor sits one interval back, off by one
    // block for historical reasons; networks past `full_retarget_start`
    // measure the full window (except for the very first one, which has
    // no extra block to reach back to).
    let mut blocks_back = interval - 1;
    if prev.height >= params.full_retarget_start && prev.height + 1 != interval {
        blocks_back = interval;
    }
    let anchor_height = prev.height - blocks_back;
    let anchor = chain
        .block_by_height(anchor_height)
        .await?
        .ok_or(StoreError::NotFound(anchor_height))?;

    let timespan = i64::from(params.target_timespan);
    let actual = (i64::from(prev.timestamp) - i64::from(anchor.timestamp))
        .clamp(timespan / 4, timespan * 4);

    let mut new_target =
        decode_compact_signed(prev.bits) * BigInt::from(actual) / BigInt::from(timespan);
    let pow_limit = decode_compact_signed(params.min_diff_bits);
    if new_target > pow_limit {
        new_target = pow_limit;
    }
    if new_target < BigInt::zero() {
        new_target = BigInt::zero();
    }
    let bits = encode_compact(&new_target.to_biguint().unwrap_or_default());

    debug!(
        height = prev.height + 1,
        actual,
        old_bits = format!("{:#010x}", prev.bits),
        new_bits = format!("{:#010x}", bits),
        "retarget at interval boundary"
    );
    Ok(bits)
}

/// Off-boundary testnet rule: a block arriving more than two spacings
/// late may be mined at minimum difficulty; otherwise the last real
/// difficulty applies, found by walking back past min-difficulty blocks
/// to the previous boundary.
async fn testnet_work_required(
    prev: &Block,
    next: &Block,
    chain: &dyn ChainStore,
    params: &NetworkParams,
) -> ConsensusResult<u32> {
    if next.timestamp > prev.timestamp + 2 * params.target_spacing {
        return Ok(params.min_diff_bits);
    }
    if prev.bits != params.min_diff_bits {
        return Ok(prev.bits);
    }

    let interval = params.interval();
    let mut height = prev.height;
    let mut bits = prev.bits;
    while height > 0 && height % interval != 0 && bits == params.min_diff_bits {
        height -= 1;
        let block = chain
            .block_by_height(height)
            .await?
            .ok_or(StoreError::NotFound(height))?;
        bits = block.bits;
    }
    Ok(bits)
}

/// Median of the last eleven block timestamps, `block`'s own included.
pub async fn median_time_past(block: &Block, chain: &dyn ChainStore) -> ConsensusResult<u32> {
    let count = MEDIAN_TIME_SPAN.min(block.height as usize + 1);
    let ancestor_heights: Vec<u32> = (1..count as u32).map(|back| block.height - back).collect();

    let ancestors = chain.blocks_by_heights(&ancestor_heights).await?;
    let mut times: Vec<u32> = ancestors.iter().map(|b| b.timestamp).collect();
    times.push(block.timestamp);
    times.sort_unstable();
    Ok(times[times.len() / 2])
}

/// Validate `child` as the immediate successor of `prev`: its difficulty
/// must be the required next work and its timestamp must move past the
/// median time of the chain.
pub async fn verify_child(
    prev: &Block,
    child: &Block,
    chain: &dyn ChainStore,
    params: &NetworkParams,
) -> ConsensusResult<()> {
    let required = next_work_required(prev, child, chain, params).await?;
    if child.bits != required {
        return Err(VerificationError::WrongDifficulty {
            got: child.bits,
            required,
        }
        .into());
    }

    let median = median_time_past(prev, chain).await?;
    if child.timestamp <= median {
        return Err(VerificationError::TimestampTooEarly {
            block_time: child.timestamp,
            median,
        }
        .into());
    }
    Ok(())
}
