use thiserror::Error;

/// Failures of the approval-gated action flow.
///
/// These are the only errors the sequencer reports on its own behalf; transport and
/// encoding problems stay in their own [`ErrorBag`](super::ErrorBag) variants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlowError {
    #[error("Invalid amount: {0:?}")]
    InvalidAmount(String),
    #[error("Amount does not fit into 256 bits: {0}")]
    Overflow(String),
    #[error("Approval failed: {0}")]
    ApprovalFailed(String),
    #[error("Action failed: {0}")]
    ActionFailed(String),
    #[error("No connected account")]
    NoActor,
    #[error("Contract {0} is not deployed")]
    NotDeployed(String),
}
