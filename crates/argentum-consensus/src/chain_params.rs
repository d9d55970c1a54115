//! Network parameters for Argentum chains.
//!
//! Static consensus parameters that never change at runtime. Use
//! [`NetworkParams::mainnet`] or [`NetworkParams::testnet`] for the
//! built-in networks, [`NetworkParams::merge_mined`] for an alternative
//! chain accepting auxiliary proof-of-work, and
//! [`NetworkParams::from_config`] for private networks.

use serde::Deserialize;

/// Base monetary unit: subunits per coin.
pub const COIN: u64 = 100_000_000;

/// Blocks between subsidy halvings.
pub const HALVING_INTERVAL: u32 = 210_000;

/// Maximum tolerated clock drift into the future, in seconds.
pub const MAX_FUTURE_DRIFT_SECS: u32 = 2 * 60 * 60;

/// Number of trailing blocks feeding the median-time-past rule.
pub const MEDIAN_TIME_SPAN: usize = 11;

/// Static consensus parameters of a network.
#[derive(Debug, Clone)]
pub struct NetworkParams {
    /// Minimum-difficulty target in compact form (the pow limit).
    pub min_diff_bits: u32,
    /// Retarget window in seconds.
    pub target_timespan: u32,
    /// Target block spacing in seconds.
    pub target_spacing: u32,
    /// Testnet difficulty rules in effect.
    pub testnet: bool,
    /// This network is an alternative chain that may accept AuxPoW.
    pub alt_chain: bool,
    /// Version bit mask marking a merge-mined block.
    pub aux_pow_flag: u32,
    /// Chain id carried in the high 16 version bits of merge-mined blocks.
    pub aux_pow_chain_id: u32,
    /// Height from which the retarget anchor steps one block further
    /// back, correcting the historical off-by-one window.
    pub full_retarget_start: u32,
}

impl NetworkParams {
    /// The main network.
    pub fn mainnet() -> Self {
        Self {
            min_diff_bits: 0x1d00ffff,
            target_timespan: 14 * 24 * 60 * 60,
            target_spacing: 10 * 60,
            testnet: false,
            alt_chain: false,
            aux_pow_flag: 1 << 8,
            aux_pow_chain_id: 0,
            full_retarget_start: u32::MAX,
        }
    }

    /// The test network: same targets, relaxed difficulty rules.
    pub fn testnet() -> Self {
        Self {
            testnet: true,
            ..Self::mainnet()
        }
    }

    /// A merge-mined alternative chain with the given aux chain id.
    pub fn merge_mined(chain_id: u32) -> Self {
        Self {
            alt_chain: true,
            aux_pow_chain_id: chain_id,
            full_retarget_start: 0,
            ..Self::mainnet()
        }
    }

    /// Blocks per retarget window.
    pub fn interval(&self) -> u32 {
        self.target_timespan / self.target_spacing
    }

    /// Build parameters from a deserialized config, filling anything
    /// unset with mainnet values.
    pub fn from_config(config: NetworkConfig) -> Self {
        let base = Self::mainnet();
        Self {
            min_diff_bits: config.min_diff_bits.unwrap_or(base.min_diff_bits),
            target_timespan: config.target_timespan.unwrap_or(base.target_timespan),
            target_spacing: config.target_spacing.unwrap_or(base.target_spacing),
            testnet: config.testnet.unwrap_or(base.testnet),
            alt_chain: config.alt_chain.unwrap_or(base.alt_chain),
            aux_pow_flag: config.aux_pow_flag.unwrap_or(base.aux_pow_flag),
            aux_pow_chain_id: config.aux_pow_chain_id.unwrap_or(base.aux_pow_chain_id),
            full_retarget_start: config
                .full_retarget_start
                .unwrap_or(base.full_retarget_start),
        }
    }
}

/// Deserializable network configuration for private networks. Every
/// field is optional; unset fields inherit the mainnet value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NetworkConfig {
    pub min_diff_bits: Option<u32>,
    pub target_timespan: Option<u32>,
    pub target_spacing: Option<u32>,
    pub testnet: Option<bool>,
    pub alt_chain: Option<bool>,
    pub aux_pow_flag: Option<u32>,
    pub aux_pow_chain_id: Option<u32>,
    pub full_retarget_start: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mainnet_interval_is_2016() {
        assert_eq!(NetworkParams::mainnet().interval(), 2016);
    }

    #[test]
    fn merge_mined_sets_chain_id() {
        let params = NetworkParams::merge_mined(0x2f);
        assert!(params.alt_chain);
        assert_eq!(params.aux_pow_chain_id, 0x2f);
        assert_eq!(params.aux_pow_flag, 0x100);
    }

    #[test]
    fn config_defaults_to_mainnet() {
        let params = NetworkParams::from_config(NetworkConfig::default());
        assert_eq!(params.min_diff_bits, 0x1d00ffff);
        assert_eq!(params.target_timespan, 1_209_600);
        assert_eq!(params.target_spacing, 600);
        assert!(!params.testnet);
    }

    #[test]
    fn config_overrides_apply() {
        let config: NetworkConfig = serde_json::from_str(
            r#"{ "target_spacing": 60, "testnet": true }"#,
        )
        .unwrap();
        let params = NetworkParams::from_config(config);
        assert_eq!(params.target_spacing, 60);
        assert!(params.testnet);
        assert_eq!(params.target_timespan, 1_209_600);
    }
}
