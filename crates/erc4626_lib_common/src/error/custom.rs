use thiserror::Error;
use web3::types::H256;

/// Free-form error, created with `err_custom_create!`
#[derive(Debug, Error)]
#[error("CustomError: {message}")]
pub struct CustomError {
    message: String,
}

impl CustomError {
    pub fn from_owned_string(message: String) -> CustomError {
        CustomError { message }
    }
}

/// Write was submitted but the node rejected it or the receipt reports a revert
#[derive(Debug, Error)]
#[error(
    "TransactionFailedError: {message}{}",
    .tx_hash.map(|tx_hash| format!(", tx: {tx_hash:#x}")).unwrap_or_default()
)]
pub struct TransactionFailedError {
    pub message: String,
    pub tx_hash: Option<H256>,
}

impl TransactionFailedError {
    pub fn new(message: &str) -> TransactionFailedError {
        TransactionFailedError {
            message: message.to_string(),
            tx_hash: None,
        }
    }

    pub fn reverted(tx_hash: H256) -> TransactionFailedError {
        TransactionFailedError {
            message: "transaction reverted".to_string(),
            tx_hash: Some(tx_hash),
        }
    }
}
