//! Block validation.
//!
//! Checks run in a fixed order and fail on the first violation: header
//! hash, proof of work (primary or auxiliary), timestamp sanity, AuxPoW
//! linkage, then the transaction set and its Merkle root.
//!
//! A merge-mined block is not required to meet the target with its own
//! header; the parent chain header inside its aux proof is, and the
//! parent's coinbase must commit to this block's hash.

use crate::chain_params::{NetworkParams, MAX_FUTURE_DRIFT_SECS};
use crate::error::VerificationError;
use argentum_types::{
    aux_branch_index, decode_compact, hash_to_biguint, to_reversed_hex, AuxPow, Block,
    Transaction, ZERO_HASH, MERGED_MINING_TAG,
};
use argentum_types::encode::read_u32_le;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, instrument, warn};

/// Wall-clock source for the timestamp-future rule.
pub trait Clock: Send + Sync {
    /// Current time in seconds since the epoch.
    fn now(&self) -> u64;
}

/// The system wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_secs())
            .unwrap_or(0)
    }
}

/// Stateless block validator for one network.
pub struct BlockValidator<C = SystemClock> {
    params: NetworkParams,
    clock: C,
    strict_aux_parent_hash: bool,
}

impl BlockValidator<SystemClock> {
    /// Validator against the system clock.
    pub fn new(params: NetworkParams) -> Self {
        Self::with_clock(params, SystemClock)
    }
}

impl<C: Clock> BlockValidator<C> {
    /// Validator with an injected clock.
    pub fn with_clock(params: NetworkParams, clock: C) -> Self {
        Self {
            params,
            clock,
            strict_aux_parent_hash: false,
        }
    }

    /// Reject aux proofs whose claimed parent hash does not match the
    /// parent header. Historical deployments only log the mismatch, so
    /// this defaults to off; turning it on tightens consensus.
    pub fn strict_aux_parent_hash(mut self, strict: bool) -> Self {
        self.strict_aux_parent_hash = strict;
        self
    }

    /// Validate a block, optionally together with its transaction set.
    #[instrument(skip_all, fields(height = block.height))]
    pub fn check_block(
        &self,
        block: &Block,
        txs: Option<&[Transaction]>,
    ) -> Result<(), VerificationError> {
        self.check_hash(block)?;
        self.check_proof_of_work(block)?;
        self.check_timestamp(block)?;
        if self.uses_aux_pow(block) {
            if let Some(aux) = block.aux.as_deref() {
                self.check_aux_merkle_link(aux)?;
                self.check_aux_coinbase(block, aux)?;
            }
        }
        if let Some(txs) = txs {
            self.check_transactions(block, txs)?;
        }
        debug!("block checks passed");
        Ok(())
    }

    fn uses_aux_pow(&self, block: &Block) -> bool {
        self.params.alt_chain && block.version & self.params.aux_pow_flag != 0
    }

    /// The recorded hash must match the header. A block that never had
    /// its hash recorded fails; the check does not recompute.
    pub fn check_hash(&self, block: &Block) -> Result<(), VerificationError> {
        match block.cached_hash() {
            None => Err(VerificationError::BadHash(
                "no hash recorded for block".into(),
            )),
            Some(stored) if stored != block.calc_hash() => {
                Err(VerificationError::BadHash(format!(
                    "recorded hash {} does not match header",
                    to_reversed_hex(&stored)
                )))
            }
            Some(_) => Ok(()),
        }
    }

    /// Compare the proof-of-work hash against the decoded target. For a
    /// merge-mined block the parent chain header does the work.
    pub fn check_proof_of_work(&self, block: &Block) -> Result<(), VerificationError> {
        let target = decode_compact(block.bits);

        let pow_hash = if self.uses_aux_pow(block) {
            let version_chain_id = block.version >> 16;
            if version_chain_id != self.params.aux_pow_chain_id {
                return Err(VerificationError::PowWrongAuxChain(format!(
                    "version chain id {version_chain_id}, ours {}",
                    self.params.aux_pow_chain_id
                )));
            }
            let aux = block.aux.as_deref().ok_or_else(|| {
                VerificationError::PowBelowTarget(
                    "merge-mined block carries no aux proof".into(),
                )
            })?;
            let parent_hash = aux.parent.calc_hash();
            if parent_hash != aux.parent_hash {
                if self.strict_aux_parent_hash {
                    return Err(VerificationError::BadHash(format!(
                        "aux parent hash {} does not match the parent header",
                        to_reversed_hex(&aux.parent_hash)
                    )));
                }
                warn!(
                    claimed = %to_reversed_hex(&aux.parent_hash),
                    computed = %to_reversed_hex(&parent_hash),
                    "aux parent hash does not match the parent header"
                );
            }
            parent_hash
        } else {
            block.calc_hash()
        };

        if hash_to_biguint(&pow_hash) > target {
            return Err(VerificationError::PowBelowTarget(format!(
                "hash {} above target {:#010x}",
                to_reversed_hex(&pow_hash),
                block.bits
            )));
        }
        Ok(())
    }

    /// The timestamp may not run ahead of the clock by more than the
    /// tolerated drift.
    pub fn check_timestamp(&self, block: &Block) -> Result<(), VerificationError> {
        let limit = self.clock.now() + MAX_FUTURE_DRIFT_SECS as u64;
        if block.timestamp as u64 > limit {
            return Err(VerificationError::TimestampTooFarFuture {
                block_time: block.timestamp,
                limit,
            });
        }
        Ok(())
    }

    /// The aux coinbase must prove into the parent block's Merkle root.
    pub fn check_aux_merkle_link(&self, aux: &AuxPow) -> Result<(), VerificationError> {
        if aux.proven_parent_root() != aux.parent.merkle_root {
            return Err(VerificationError::AuxPowMerkleLink);
        }
        Ok(())
    }

    /// The parent coinbase script must commit to this block.
    ///
    /// The expected bytes are the reversed aggregation root (or block
    /// hash) and must sit directly after the merged-mining tag; tagless
    /// legacy scripts get a 20-byte grace window. The two little-endian
    /// words after the hash carry the aggregation size and the script
    /// nonce the chain's slot derives from.
    pub fn check_aux_coinbase(
        &self,
        block: &Block,
        aux: &AuxPow,
    ) -> Result<(), VerificationError> {
        let script = aux
            .coinbase
            .first_input_script()
            .ok_or(VerificationError::AuxPowHashNotInScript)?;
        let expected = aux.expected_script_hash(&block.calc_hash());

        let hash_pos = find_subslice(script, &expected)
            .ok_or(VerificationError::AuxPowHashNotInScript)?;

        match find_subslice(script, &MERGED_MINING_TAG) {
            Some(tag_pos) => {
                if count_subslices(script, &MERGED_MINING_TAG) > 1 {
                    return Err(VerificationError::AuxPowHeaderDuplicated);
                }
                if hash_pos != tag_pos + MERGED_MINING_TAG.len() {
                    return Err(VerificationError::AuxPowHashNotAfterHeader);
                }
            }
            None if hash_pos > 20 => {
                return Err(VerificationError::AuxPowLegacyOffset { offset: hash_pos });
            }
            None => {}
        }

        let trailer = &script[hash_pos + expected.len()..];
        let merkle_size = read_u32_le(trailer).ok_or_else(|| {
            VerificationError::AuxPowSizeMismatch(
                "script ends before the aggregation size".into(),
            )
        })?;
        let script_nonce = trailer.get(4..).and_then(read_u32_le).ok_or_else(|| {
            VerificationError::AuxPowSizeMismatch(
                "script ends before the aggregation nonce".into(),
            )
        })?;

        let branch_len = aux.blockchain_branch.len() as u32;
        if branch_len >= 32 || merkle_size != 1u32 << branch_len {
            return Err(VerificationError::AuxPowSizeMismatch(format!(
                "committed size {merkle_size}, branch length {branch_len}"
            )));
        }

        let expected_index =
            aux_branch_index(script_nonce, self.params.aux_pow_chain_id, merkle_size);
        if aux.blockchain_branch_mask != expected_index {
            return Err(VerificationError::AuxPowMaskMismatch {
                branch_mask: aux.blockchain_branch_mask,
                expected: expected_index,
            });
        }
        Ok(())
    }

    fn check_transactions(
        &self,
        block: &Block,
        txs: &[Transaction],
    ) -> Result<(), VerificationError> {
        if txs.is_empty() {
            return Err(VerificationError::NoTransactions);
        }
        if !txs[0].is_coinbase() {
            return Err(VerificationError::FirstTxNotCoinbase);
        }
        for (index, tx) in txs.iter().enumerate().skip(1) {
            if tx.is_coinbase() {
                return Err(VerificationError::NonFirstTxIsCoinbase { index });
            }
        }
        if block.merkle_root == ZERO_HASH {
            return Err(VerificationError::NoMerkleRoot);
        }
        let computed = Block::calc_merkle_root(txs);
        if computed != block.merkle_root {
            return Err(VerificationError::MerkleRootMismatch {
                computed: to_reversed_hex(&computed),
                header: to_reversed_hex(&block.merkle_root),
            });
        }
        Ok(())
    }
}

fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|window| window == needle)
}

fn count_subslices(haystack: &[u8], needle: &[u8]) -> usize {
    haystack
        .windows(needle.len())
        .filter(|window| *window == needle)
        .count()
}
