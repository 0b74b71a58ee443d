use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::error::*;
use crate::{err_custom_create, err_from};
use erc4626_lib_common::utils::whole_tokens_to_base_units;
use tokio::fs;
use web3::types::{Address, U256};

/// Approval ceiling in whole tokens. Deposit and mint approve this much instead of the
/// requested amount so that following actions do not need another approval.
pub const DEFAULT_APPROVAL_CEILING_TOKENS: u64 = 900_000_000;

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct Chain {
    pub chain_name: String,
    pub chain_id: u64,
    pub rpc_endpoint: String,
    /// gwei
    pub priority_fee: rust_decimal::Decimal,
    /// gwei
    pub max_fee_per_gas: rust_decimal::Decimal,
    #[serde(default = "default_confirmation_blocks")]
    pub confirmation_blocks: usize,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    pub block_explorer_url: Option<String>,
}

fn default_confirmation_blocks() -> usize {
    1
}

fn default_poll_interval_ms() -> u64 {
    1000
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct Contracts {
    pub vault: Address,
    pub asset: Address,
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum AllowancePolicy {
    /// Read the allowance again after the approval is acknowledged and abort if it is
    /// still lower than the amount
    #[default]
    RecheckAndAbort,
    /// Issue the action write right after the approval is acknowledged
    TrustAndProceed,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct Actions {
    #[serde(default = "default_approval_ceiling_tokens")]
    pub approval_ceiling_tokens: u64,
    #[serde(default)]
    pub allowance_policy: AllowancePolicy,
    /// No timeout when missing, the flow waits for acknowledgment indefinitely
    pub action_timeout_secs: Option<u64>,
}

fn default_approval_ceiling_tokens() -> u64 {
    DEFAULT_APPROVAL_CEILING_TOKENS
}

impl Default for Actions {
    fn default() -> Self {
        Actions {
            approval_ceiling_tokens: DEFAULT_APPROVAL_CEILING_TOKENS,
            allowance_policy: AllowancePolicy::default(),
            action_timeout_secs: None,
        }
    }
}

impl Actions {
    pub fn approval_ceiling(&self) -> U256 {
        whole_tokens_to_base_units(self.approval_ceiling_tokens)
    }

    pub fn action_timeout(&self) -> Option<Duration> {
        self.action_timeout_secs.map(Duration::from_secs)
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct Config {
    pub chain: Chain,
    pub contracts: Contracts,
    #[serde(default)]
    pub actions: Actions,
}

impl Config {
    pub fn load_from_str(str: &str) -> Result<Self, VaultError> {
        match toml::from_str(str) {
            Ok(config) => Ok(config),
            Err(e) => Err(err_custom_create!("Failed to parse toml {}: {}", str, e)),
        }
    }

    pub async fn load<P: AsRef<Path> + std::fmt::Display>(path: P) -> Result<Self, VaultError> {
        let content = fs::read_to_string(&path).await.map_err(err_from!())?;
        match toml::from_str(&content) {
            Ok(config) => Ok(config),
            Err(e) => Err(err_custom_create!("Failed to parse toml {}: {}", path, e)),
        }
    }
}
