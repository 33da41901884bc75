use std::path::{Path, PathBuf};

use cosmwasm_std::IbcOrder;
use serde::{Deserialize, Serialize};

use crate::{error::E2eError, relay::Side, wait::SettlePolicy};

/// Names the json config file read by [`E2eConfig::from_env`].
pub const CONFIG_ENV: &str = "ICS721_E2E_CONFIG";

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct E2eConfig {
    /// Directory contract binaries are read from.
    pub artifact_root: PathBuf,
    pub chain_a: ChainConfig,
    pub chain_b: ChainConfig,
    pub channel: ChannelConfig,
    /// Block height transfers time out at unless a scenario says otherwise.
    pub transfer_timeout_height: u64,
    pub settle: SettlePolicy,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ChainConfig {
    pub chain_id: String,
    pub bech32_prefix: String,
    /// Seed of the signing identity. Each chain gets its own so runs
    /// sharing a chain never race on account sequences.
    pub mnemonic: String,
    /// Revision number of the chain's heights.
    pub revision: u64,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct ChannelConfig {
    pub version: String,
    pub order: ChannelOrder,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ChannelOrder {
    Ordered,
    Unordered,
}

impl From<ChannelOrder> for IbcOrder {
    fn from(order: ChannelOrder) -> Self {
        match order {
            ChannelOrder::Ordered => IbcOrder::Ordered,
            ChannelOrder::Unordered => IbcOrder::Unordered,
        }
    }
}

impl Default for E2eConfig {
    fn default() -> Self {
        Self {
            artifact_root: PathBuf::from("./internal"),
            chain_a: ChainConfig {
                chain_id: "wasmd-1".to_string(),
                bech32_prefix: "wasm".to_string(),
                mnemonic: "enlist hip relief stomach skate base shallow young switch frequent cry park"
                    .to_string(),
                revision: 1,
            },
            chain_b: ChainConfig {
                chain_id: "osmo-testing-1".to_string(),
                bech32_prefix: "osmo".to_string(),
                mnemonic: "remain fragile remove stamp quiz bus country dress critic mammal office need"
                    .to_string(),
                revision: 1,
            },
            channel: ChannelConfig::default(),
            transfer_timeout_height: 90000,
            settle: SettlePolicy::default(),
        }
    }
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            version: "ics721-1".to_string(),
            order: ChannelOrder::Unordered,
        }
    }
}

impl E2eConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, E2eError> {
        let path = path.as_ref();
        let config_error = |reason: String| E2eError::Config {
            path: path.display().to_string(),
            reason,
        };
        let raw = std::fs::read(path).map_err(|e| config_error(e.to_string()))?;
        serde_json::from_slice(&raw).map_err(|e| config_error(e.to_string()))
    }

    /// Loads the file named by `ICS721_E2E_CONFIG`, or the defaults.
    pub fn from_env() -> Result<Self, E2eError> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) => {
                tracing::info!(path = ?path, "loading e2e config");
                Self::load(path)
            }
            None => Ok(Self::default()),
        }
    }

    pub fn chain(&self, side: Side) -> &ChainConfig {
        match side {
            Side::A => &self.chain_a,
            Side::B => &self.chain_b,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let config: E2eConfig = serde_json::from_str(
            r#"{"artifact_root": "/tmp/wasm", "channel": {"order": "ordered"}}"#,
        )
        .unwrap();
        assert_eq!(config.artifact_root, PathBuf::from("/tmp/wasm"));
        assert_eq!(config.channel.order, ChannelOrder::Ordered);
        assert_eq!(config.channel.version, "ics721-1");
        assert_eq!(config.transfer_timeout_height, 90000);
        assert_eq!(config.chain_b.bech32_prefix, "osmo");
    }

    #[test]
    fn missing_file_is_a_config_error() {
        let err = E2eConfig::load("/nonexistent/ics721-e2e.json").unwrap_err();
        assert!(matches!(err, E2eError::Config { .. }));
    }

    #[test]
    fn chains_use_distinct_identities() {
        let config = E2eConfig::default();
        assert_ne!(config.chain_a.mnemonic, config.chain_b.mnemonic);
        assert_eq!(IbcOrder::from(config.channel.order), IbcOrder::Unordered);
    }
}
