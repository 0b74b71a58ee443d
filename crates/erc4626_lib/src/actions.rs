use crate::amount::to_base_units;
use crate::client::ContractClient;
use crate::contracts::ContractName;
use crate::err_create;
use crate::error::*;
use crate::sequencer::{acknowledged, ActionOutcome, FlowState, SequencerState};
use erc4626_lib_common::utils::U256ConvExt;
use std::sync::Arc;
use std::time::Duration;
use web3::ethabi::Token;

/// Calls `faucet()` on the asset, no amount and no allowance involved
pub struct FaucetAction {
    client: Arc<dyn ContractClient>,
    timeout: Option<Duration>,
    state: FlowState,
}

impl FaucetAction {
    pub fn new(client: Arc<dyn ContractClient>, timeout: Option<Duration>) -> Self {
        Self {
            client,
            timeout,
            state: FlowState::new(),
        }
    }

    pub fn state(&self) -> SequencerState {
        self.state.current()
    }

    pub async fn trigger(&self) -> Result<ActionOutcome, VaultError> {
        if !self.state.try_begin(SequencerState::Acting) {
            return Ok(ActionOutcome::Ignored);
        }
        log::info!("Requesting tokens from faucet");
        let res = acknowledged(
            self.client.write(ContractName::TestToken, "faucet", vec![]),
            self.timeout,
        )
        .await
        .map(|action| ActionOutcome::Completed {
            approval: None,
            action,
        })
        .map_err(|err| err_create!(FlowError::ActionFailed(err.to_string())));
        self.state.finish(&res);
        res
    }
}

/// Donates assets to the vault with a plain `transfer`, raising its share price.
/// The transfer spends the sender's own balance, so no allowance is checked.
pub struct DonationAction {
    client: Arc<dyn ContractClient>,
    timeout: Option<Duration>,
    state: FlowState,
}

impl DonationAction {
    pub fn new(client: Arc<dyn ContractClient>, timeout: Option<Duration>) -> Self {
        Self {
            client,
            timeout,
            state: FlowState::new(),
        }
    }

    pub fn state(&self) -> SequencerState {
        self.state.current()
    }

    pub async fn trigger(&self, raw_amount: &str) -> Result<ActionOutcome, VaultError> {
        if raw_amount.is_empty() {
            return Ok(ActionOutcome::Skipped);
        }
        if !self.state.try_begin(SequencerState::Acting) {
            return Ok(ActionOutcome::Ignored);
        }
        let res = self.run(raw_amount).await;
        self.state.finish(&res);
        res
    }

    async fn run(&self, raw_amount: &str) -> Result<ActionOutcome, VaultError> {
        let amount = to_base_units(raw_amount)?;
        let vault = self
            .client
            .deployed_info(ContractName::TestVault)
            .ok_or(err_create!(FlowError::NotDeployed(
                ContractName::TestVault.to_string()
            )))?
            .address;
        log::info!("Donating {} to vault {:#x}", amount.to_eth_str(), vault);
        let action = acknowledged(
            self.client.write(
                ContractName::TestToken,
                "transfer",
                vec![Token::Address(vault), Token::Uint(amount)],
            ),
            self.timeout,
        )
        .await
        .map_err(|err| err_create!(FlowError::ActionFailed(err.to_string())))?;
        Ok(ActionOutcome::Completed {
            approval: None,
            action,
        })
    }
}
