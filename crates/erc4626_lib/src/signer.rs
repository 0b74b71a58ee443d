use crate::contracts::DUMMY_RPC_PROVIDER;
use crate::eth::get_eth_addr_from_secret;
use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use secp256k1::SecretKey;
use std::fmt::{Display, Formatter};
use web3::types::{Address, SignedTransaction, TransactionParameters};

#[derive(Debug)]
pub struct SignerError {
    pub message: String,
}

impl Display for SignerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "SignerError: {}", self.message)
    }
}

pub trait Signer: Send + Sync {
    /// Account this signer signs for
    fn address(&self) -> Address;

    fn sign(&self, tp: TransactionParameters) -> BoxFuture<'_, Result<SignedTransaction, SignerError>>;
}

/// Signs with a single private key held in memory
pub struct PrivateKeySigner {
    secret_key: SecretKey,
    address: Address,
}

impl PrivateKeySigner {
    pub fn new(secret_key: SecretKey) -> Self {
        let address = get_eth_addr_from_secret(&secret_key);
        Self {
            secret_key,
            address,
        }
    }
}

impl Signer for PrivateKeySigner {
    fn address(&self) -> Address {
        self.address
    }

    fn sign(&self, tp: TransactionParameters) -> BoxFuture<'_, Result<SignedTransaction, SignerError>> {
        async move {
            DUMMY_RPC_PROVIDER
                .accounts()
                .sign_transaction(tp, &self.secret_key)
                .await
                .map_err(|err| SignerError {
                    message: format!("Error when signing transaction in PrivateKeySigner {err}"),
                })
        }
        .boxed()
    }
}
