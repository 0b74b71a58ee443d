use crate::client::ContractClient;
use crate::contracts::ContractName;
use crate::error::VaultError;
use erc4626_lib_common::utils::{u256_to_decimal_string, Decimals};
use serde::Serialize;
use std::fmt::{Display, Formatter};
use web3::ethabi::Token;
use web3::types::{Address, U256};

/// Snapshot of what the balances panel shows.
///
/// Values the client could not read stay `None` and display as `0`.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenBalances {
    pub vault_address: Option<Address>,
    pub asset_address: Option<Address>,
    pub min_deposit_amount: Option<U256>,
    pub max_total_amount: Option<U256>,
    pub shares_balance: Option<U256>,
    pub asset_balance: Option<U256>,
    #[serde(skip)]
    pub block_explorer_url: Option<String>,
}

async fn read_uint(
    client: &dyn ContractClient,
    contract: ContractName,
    function: &str,
    args: Vec<Token>,
) -> Option<U256> {
    match client.read(contract, function, args).await {
        Ok(tokens) => tokens.into_iter().next().and_then(Token::into_uint),
        Err(err) => {
            log::warn!("Failed to read {}.{}: {}", contract, function, err);
            None
        }
    }
}

impl TokenBalances {
    pub async fn load(
        client: &dyn ContractClient,
        account: Option<Address>,
    ) -> Result<TokenBalances, VaultError> {
        let vault_address = client
            .deployed_info(ContractName::TestVault)
            .map(|info| info.address);
        let asset_address = client
            .deployed_info(ContractName::TestToken)
            .map(|info| info.address);

        let min_deposit_amount =
            read_uint(client, ContractName::TestVault, "minDepositAmount", vec![]).await;
        let max_total_amount =
            read_uint(client, ContractName::TestVault, "maxTotalAmount", vec![]).await;
        let (shares_balance, asset_balance) = match account {
            Some(account) => (
                read_uint(
                    client,
                    ContractName::TestVault,
                    "balanceOf",
                    vec![Token::Address(account)],
                )
                .await,
                read_uint(
                    client,
                    ContractName::TestToken,
                    "balanceOf",
                    vec![Token::Address(account)],
                )
                .await,
            ),
            None => (None, None),
        };

        Ok(TokenBalances {
            vault_address,
            asset_address,
            min_deposit_amount,
            max_total_amount,
            shares_balance,
            asset_balance,
            block_explorer_url: None,
        })
    }

    pub fn with_block_explorer(mut self, block_explorer_url: Option<String>) -> Self {
        self.block_explorer_url = block_explorer_url;
        self
    }

    /// Link to the address page of the block explorer, the bare address without explorer
    pub fn address_link(&self, address: Option<Address>) -> String {
        let address = address.map(|a| format!("{a:#x}")).unwrap_or_default();
        match &self.block_explorer_url {
            Some(url) => format!("{}/address/{}", url.trim_end_matches('/'), address),
            None => address,
        }
    }
}

pub fn format_balance(balance: Option<U256>) -> String {
    match balance {
        Some(balance) if !balance.is_zero() => {
            u256_to_decimal_string(balance, Decimals::Eighteen, Some(18))
        }
        _ => "0".to_string(),
    }
}

impl Display for TokenBalances {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Vault: {}", self.address_link(self.vault_address))?;
        writeln!(f, "Asset: {}", self.address_link(self.asset_address))?;
        writeln!(f, "MinDepositAmount: {}", format_balance(self.min_deposit_amount))?;
        writeln!(f, "MaxTotalAmount: {}", format_balance(self.max_total_amount))?;
        writeln!(f, "Shares Balance: {}", format_balance(self.shares_balance))?;
        write!(f, "Asset Balance: {}", format_balance(self.asset_balance))
    }
}
