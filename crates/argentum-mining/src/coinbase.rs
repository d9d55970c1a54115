//! Coinbase construction and the block subsidy schedule.

use argentum_consensus::{COIN, HALVING_INTERVAL};
use argentum_types::{Transaction, TxIn, TxOut, COINBASE_OUTPOINT};
use tracing::debug;

/// Block subsidy at `height`: 50 coins, halved every 210 000 blocks
/// until it shifts to nothing.
pub fn block_value(height: u32) -> u64 {
    let halvings = height / HALVING_INTERVAL;
    if halvings >= 64 {
        return 0;
    }
    (50 * COIN) >> halvings
}

/// The coinbase transaction for a block at `height` paying
/// `beneficiary_script`: one input spending the reserved outpoint with
/// an empty script, one output carrying the subsidy.
pub fn build_coinbase(height: u32, beneficiary_script: &[u8]) -> Transaction {
    let value = block_value(height);
    debug!(height, value, "building coinbase");
    Transaction {
        version: 1,
        ins: vec![TxIn {
            prev_out: COINBASE_OUTPOINT,
            script: Vec::new(),
            sequence: 0xffff_ffff,
        }],
        outs: vec![TxOut {
            value,
            script: beneficiary_script.to_vec(),
        }],
        lock_time: 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subsidy_halves_on_schedule() {
        assert_eq!(block_value(0), 50 * COIN);
        assert_eq!(block_value(209_999), 50 * COIN);
        assert_eq!(block_value(210_000), 25 * COIN);
        assert_eq!(block_value(420_000), 50 * COIN / 4);
        assert_eq!(block_value(33 * 210_000), 0);
        assert_eq!(block_value(u32::MAX), 0);
    }

    #[test]
    fn coinbase_shape() {
        let script = [0x76, 0xa9, 0x14];
        let tx = build_coinbase(1, &script);
        assert!(tx.is_coinbase());
        assert_eq!(tx.ins[0].script, Vec::<u8>::new());
        assert_eq!(tx.ins[0].sequence, 0xffff_ffff);
        assert_eq!(tx.outs.len(), 1);
        assert_eq!(tx.outs[0].value, 50 * COIN);
        assert_eq!(tx.outs[0].script, script.to_vec());
    }
}
