use lazy_static::lazy_static;

use crate::err_custom_create;
use crate::error::VaultError;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use web3::contract::Contract;
use web3::ethabi::Token;
use web3::transports::Http;
use web3::types::Address;
use web3::Web3;

lazy_static! {
    pub static ref DUMMY_RPC_PROVIDER: Web3<Http> = {
        let transport = web3::transports::Http::new("http://noconn").unwrap();
        Web3::new(transport)
    };
    pub static ref TEST_TOKEN_CONTRACT_TEMPLATE: Contract<Http> =
        prepare_contract_template(include_bytes!("../contracts/test_token.json")).unwrap();
    pub static ref TEST_VAULT_CONTRACT_TEMPLATE: Contract<Http> =
        prepare_contract_template(include_bytes!("../contracts/test_vault.json")).unwrap();
}

/// Contracts the console talks to, named like their deployments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ContractName {
    /// ERC-4626 vault
    TestVault,
    /// ERC-20 asset of the vault, with a public faucet
    TestToken,
}

impl ContractName {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContractName::TestVault => "TestVault",
            ContractName::TestToken => "TestToken",
        }
    }

    pub fn template(&self) -> &'static Contract<Http> {
        match self {
            ContractName::TestVault => &TEST_VAULT_CONTRACT_TEMPLATE,
            ContractName::TestToken => &TEST_TOKEN_CONTRACT_TEMPLATE,
        }
    }
}

impl Display for ContractName {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn prepare_contract_template(json_abi: &[u8]) -> Result<Contract<Http>, VaultError> {
    let contract = Contract::from_json(
        DUMMY_RPC_PROVIDER.eth(),
        Address::from_str("0x0000000000000000000000000000000000000000").unwrap(),
        json_abi,
    )
    .map_err(|err| err_custom_create!("Failed to create contract {err}"))?;

    Ok(contract)
}

pub fn contract_encode(
    contract: ContractName,
    func: &str,
    args: &[Token],
) -> Result<Vec<u8>, web3::ethabi::Error> {
    contract
        .template()
        .abi()
        .function(func)
        .and_then(|function| function.encode_input(args))
}

pub fn contract_decode_output(
    contract: ContractName,
    func: &str,
    data: &[u8],
) -> Result<Vec<Token>, web3::ethabi::Error> {
    contract
        .template()
        .abi()
        .function(func)
        .and_then(|function| function.decode_output(data))
}
