use crate::contracts::ContractName;
use crate::error::VaultError;
use futures_util::future::BoxFuture;
use serde::Serialize;
use web3::ethabi::Token;
use web3::types::{Address, H256};

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DeployedInfo {
    pub address: Address,
}

/// Returned once a write is acknowledged (included with the configured confirmations)
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WriteReceipt {
    pub transaction_hash: H256,
    pub block_hash: Option<H256>,
    pub block_number: Option<u64>,
}

/// Read/write access to deployed contracts on behalf of the connected account.
///
/// Everything the action flow does on chain goes through this trait; the flow never
/// builds a client itself. Reads may be deduplicated by implementations.
pub trait ContractClient: Send + Sync {
    /// Connected identity, None when no account is available
    fn account(&self) -> Option<Address>;

    fn deployed_info(&self, contract: ContractName) -> Option<DeployedInfo>;

    /// Call a view function and return decoded outputs
    fn read(
        &self,
        contract: ContractName,
        function: &str,
        args: Vec<Token>,
    ) -> BoxFuture<'_, Result<Vec<Token>, VaultError>>;

    /// Submit a transaction and resolve when it is acknowledged
    fn write(
        &self,
        contract: ContractName,
        function: &str,
        args: Vec<Token>,
    ) -> BoxFuture<'_, Result<WriteReceipt, VaultError>>;
}
