use crate::client::{ContractClient, DeployedInfo, WriteReceipt};
use crate::config::{Chain, Config, Contracts};
use crate::contracts::{contract_decode_output, contract_encode, ContractName};
use crate::error::*;
use crate::signer::Signer;
use crate::utils::DecimalConvExt;
use crate::{err_create, err_custom_create, err_from, err_from_msg};
use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use secp256k1::{PublicKey, SecretKey};
use sha3::Digest;
use sha3::Keccak256;
use std::str::FromStr;
use std::time::Duration;
use web3::ethabi::Token;
use web3::transports::Http;
use web3::types::{Address, BlockNumber, Bytes, CallRequest, TransactionParameters, U256, U64};
use web3::Web3;

pub fn get_eth_addr_from_secret(secret_key: &SecretKey) -> Address {
    Address::from_slice(
        &Keccak256::digest(
            &PublicKey::from_secret_key(&secp256k1::Secp256k1::new(), secret_key)
                .serialize_uncompressed()[1..65],
        )
        .as_slice()[12..],
    )
}

pub fn load_private_key(str: &str) -> Result<SecretKey, VaultError> {
    //do not disclose the private key in error message
    SecretKey::from_str(str.trim().trim_start_matches("0x"))
        .map_err(|_| err_custom_create!("Failed to parse private key"))
}

/// Contract client talking to a node over HTTP JSON-RPC.
/// Without a signer it is read-only and reports no account.
pub struct Web3ContractClient {
    web3: Web3<Http>,
    chain: Chain,
    contracts: Contracts,
    signer: Option<Box<dyn Signer>>,
}

impl Web3ContractClient {
    pub fn new(config: &Config, signer: Option<Box<dyn Signer>>) -> Result<Self, VaultError> {
        let transport = Http::new(&config.chain.rpc_endpoint).map_err(err_from_msg!(
            "Failed to create transport for {}",
            config.chain.rpc_endpoint
        ))?;
        Ok(Self {
            web3: Web3::new(transport),
            chain: config.chain.clone(),
            contracts: config.contracts.clone(),
            signer,
        })
    }

    fn contract_address(&self, contract: ContractName) -> Address {
        match contract {
            ContractName::TestVault => self.contracts.vault,
            ContractName::TestToken => self.contracts.asset,
        }
    }

    async fn read_internal(
        &self,
        contract: ContractName,
        function: String,
        args: Vec<Token>,
    ) -> Result<Vec<Token>, VaultError> {
        let call_data = contract_encode(contract, &function, &args).map_err(err_from!())?;
        let res = self
            .web3
            .eth()
            .call(
                CallRequest {
                    from: self.account(),
                    to: Some(self.contract_address(contract)),
                    data: Some(Bytes(call_data)),
                    ..Default::default()
                },
                None,
            )
            .await
            .map_err(err_from_msg!("Failed to call {}.{}", contract, function))?;
        contract_decode_output(contract, &function, &res.0).map_err(err_from_msg!(
            "Invalid response from {}.{}: {:?}. Probably not a valid contract {:#x}",
            contract,
            function,
            res.0,
            self.contract_address(contract)
        ))
    }

    async fn write_internal(
        &self,
        contract: ContractName,
        function: String,
        args: Vec<Token>,
    ) -> Result<WriteReceipt, VaultError> {
        let signer = self
            .signer
            .as_ref()
            .ok_or(err_create!(FlowError::NoActor))?;
        let from = signer.address();
        let to = self.contract_address(contract);
        let call_data = contract_encode(contract, &function, &args).map_err(err_from!())?;

        let nonce = self
            .web3
            .eth()
            .transaction_count(from, Some(BlockNumber::Pending))
            .await
            .map_err(err_from!())?;
        let gas_est = self
            .web3
            .eth()
            .estimate_gas(
                CallRequest {
                    from: Some(from),
                    to: Some(to),
                    data: Some(Bytes(call_data.clone())),
                    ..Default::default()
                },
                None,
            )
            .await
            .map_err(err_from_msg!("Gas estimation of {}.{} failed", contract, function))?;

        let tp = TransactionParameters {
            nonce: Some(nonce),
            to: Some(to),
            gas: gas_est * U256::from(12) / U256::from(10),
            gas_price: None,
            value: U256::zero(),
            data: Bytes(call_data),
            chain_id: Some(self.chain.chain_id),
            transaction_type: Some(U64::from(2)),
            access_list: None,
            max_fee_per_gas: Some(
                self.chain
                    .max_fee_per_gas
                    .to_u256_from_gwei()
                    .map_err(err_from!())?,
            ),
            max_priority_fee_per_gas: Some(
                self.chain
                    .priority_fee
                    .to_u256_from_gwei()
                    .map_err(err_from!())?,
            ),
        };
        let signed = signer.sign(tp).await.map_err(|err| {
            err_create!(TransactionFailedError::new(&err.to_string()))
        })?;
        log::debug!(
            "Sending {}.{} nonce: {} hash: {:#x}",
            contract,
            function,
            nonce,
            signed.transaction_hash
        );

        let receipt = web3::confirm::send_raw_transaction_with_confirmation(
            self.web3.transport().clone(),
            signed.raw_transaction,
            Duration::from_millis(self.chain.poll_interval_ms),
            self.chain.confirmation_blocks,
        )
        .await
        .map_err(err_from_msg!("{}.{} not acknowledged", contract, function))?;

        if receipt.status == Some(U64::from(0)) {
            return Err(err_create!(TransactionFailedError::reverted(
                receipt.transaction_hash
            )));
        }
        if let Some(block_hash) = receipt.block_hash {
            log::info!(
                "📦 {}.{} transaction blockHash {:#x}",
                contract,
                function,
                block_hash
            );
        }
        Ok(WriteReceipt {
            transaction_hash: receipt.transaction_hash,
            block_hash: receipt.block_hash,
            block_number: receipt.block_number.map(|n| n.as_u64()),
        })
    }
}

impl ContractClient for Web3ContractClient {
    fn account(&self) -> Option<Address> {
        self.signer.as_ref().map(|signer| signer.address())
    }

    fn deployed_info(&self, contract: ContractName) -> Option<DeployedInfo> {
        let address = self.contract_address(contract);
        if address.is_zero() {
            None
        } else {
            Some(DeployedInfo { address })
        }
    }

    fn read(
        &self,
        contract: ContractName,
        function: &str,
        args: Vec<Token>,
    ) -> BoxFuture<'_, Result<Vec<Token>, VaultError>> {
        self.read_internal(contract, function.to_string(), args)
            .boxed()
    }

    fn write(
        &self,
        contract: ContractName,
        function: &str,
        args: Vec<Token>,
    ) -> BoxFuture<'_, Result<WriteReceipt, VaultError>> {
        self.write_internal(contract, function.to_string(), args)
            .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_eth_addr_from_secret() {
        let sk = load_private_key(
            "0x0000000000000000000000000000000000000000000000000000000000000001",
        )
        .unwrap();
        let addr = format!("{:#x}", get_eth_addr_from_secret(&sk));
        assert_eq!(addr, "0x7e5f4552091a69125d5dfcb7b8c2659029395bdf");
    }

    #[test]
    fn test_load_private_key_invalid() {
        let err = load_private_key("not a key").unwrap_err();
        assert!(err.to_string().contains("Failed to parse private key"));
        assert!(!err.to_string().contains("not a key"));
    }
}
