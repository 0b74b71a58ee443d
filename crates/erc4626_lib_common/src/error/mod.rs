mod bag;
mod custom;
mod flow;
mod wrapped;

pub use bag::ErrorBag;
pub use custom::{CustomError, TransactionFailedError};
pub use flow::FlowError;
pub use wrapped::VaultError;

/// Export macros for creating errors
mod macros;
