use super::{CustomError, FlowError, TransactionFailedError};
use crate::utils::ConversionError;
use std::time::Duration;
use thiserror::Error;

/// Every error source the vault libraries produce, wrapped by [`VaultError`](super::VaultError)
#[derive(Debug, Error)]
pub enum ErrorBag {
    #[error("{0}")]
    IoError(#[from] std::io::Error),
    #[error("{0}")]
    CustomError(#[from] CustomError),
    #[error("{0}")]
    TransactionFailedError(#[from] TransactionFailedError),
    #[error("{0}")]
    FlowError(#[from] FlowError),
    #[error("{0:?}")]
    EthAbiError(#[from] web3::ethabi::Error),
    #[error("{0:?}")]
    Web3Error(#[from] web3::Error),
    #[error("{0}")]
    ConversionError(#[from] ConversionError),
    #[error("Time limit reached: {0:?}")]
    TimeLimitReached(Duration),
}

impl From<Duration> for ErrorBag {
    fn from(elapsed: Duration) -> Self {
        ErrorBag::TimeLimitReached(elapsed)
    }
}
