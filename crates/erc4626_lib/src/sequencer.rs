use crate::allowance::{check_allowance, needs_approval, AllowanceRequest};
use crate::amount::to_base_units;
use crate::client::{ContractClient, WriteReceipt};
use crate::config::{Actions, AllowancePolicy, DEFAULT_APPROVAL_CEILING_TOKENS};
use crate::contracts::ContractName;
use crate::error::*;
use crate::err_create;
use erc4626_lib_common::utils::{whole_tokens_to_base_units, U256ConvExt};
use std::fmt::{Display, Formatter};
use std::future::Future;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use web3::ethabi::Token;
use web3::types::{Address, U256};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Deposit,
    Mint,
    Withdraw,
    Redeem,
}

impl ActionKind {
    pub const ALL: [ActionKind; 4] = [
        ActionKind::Deposit,
        ActionKind::Mint,
        ActionKind::Withdraw,
        ActionKind::Redeem,
    ];

    /// Asset-in actions pull tokens from the actor and need an allowance on the vault
    pub fn requires_allowance(&self) -> bool {
        matches!(self, ActionKind::Deposit | ActionKind::Mint)
    }

    pub fn function_name(&self) -> &'static str {
        match self {
            ActionKind::Deposit => "deposit",
            ActionKind::Mint => "mint",
            ActionKind::Withdraw => "withdraw",
            ActionKind::Redeem => "redeem",
        }
    }

    /// Deposit/mint receive into the actor, withdraw/redeem pay out to and burn from the actor
    pub fn shape_args(&self, amount: U256, actor: Address) -> Vec<Token> {
        match self {
            ActionKind::Deposit | ActionKind::Mint => {
                vec![Token::Uint(amount), Token::Address(actor)]
            }
            ActionKind::Withdraw | ActionKind::Redeem => vec![
                Token::Uint(amount),
                Token::Address(actor),
                Token::Address(actor),
            ],
        }
    }
}

impl Display for ActionKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ActionKind::Deposit => f.write_str("Deposit"),
            ActionKind::Mint => f.write_str("Mint"),
            ActionKind::Withdraw => f.write_str("Withdraw"),
            ActionKind::Redeem => f.write_str("Redeem"),
        }
    }
}

impl FromStr for ActionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "deposit" => Ok(ActionKind::Deposit),
            "mint" => Ok(ActionKind::Mint),
            "withdraw" => Ok(ActionKind::Withdraw),
            "redeem" => Ok(ActionKind::Redeem),
            _ => Err(format!("Unknown action {s}")),
        }
    }
}

/// Everything a single trigger acts on, fixed when the trigger starts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionRequest {
    pub kind: ActionKind,
    pub amount: U256,
    pub actor: Address,
    pub vault: Address,
    pub asset: Address,
}

impl ActionRequest {
    pub fn args(&self) -> Vec<Token> {
        self.kind.shape_args(self.amount, self.actor)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequencerState {
    Idle,
    /// Reading the allowance to decide whether an approval is needed
    Checking,
    Approving,
    Acting,
    /// Transient, always followed by Idle
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    /// Nothing was typed
    Skipped,
    /// Another action of the same surface is still in flight
    Ignored,
    Completed {
        approval: Option<WriteReceipt>,
        action: WriteReceipt,
    },
}

#[derive(Debug, Clone)]
pub struct SequencerSettings {
    pub approval_ceiling: U256,
    pub allowance_policy: AllowancePolicy,
    pub action_timeout: Option<Duration>,
}

impl Default for SequencerSettings {
    fn default() -> Self {
        SequencerSettings {
            approval_ceiling: whole_tokens_to_base_units(DEFAULT_APPROVAL_CEILING_TOKENS),
            allowance_policy: AllowancePolicy::default(),
            action_timeout: None,
        }
    }
}

impl From<&Actions> for SequencerSettings {
    fn from(actions: &Actions) -> Self {
        SequencerSettings {
            approval_ceiling: actions.approval_ceiling(),
            allowance_policy: actions.allowance_policy,
            action_timeout: actions.action_timeout(),
        }
    }
}

/// Pending state shared by all action flows. Leaving Idle is a compare-and-set, so at
/// most one trigger runs at a time even when triggers race from different tasks.
pub(crate) struct FlowState {
    state: watch::Sender<SequencerState>,
}

impl FlowState {
    pub(crate) fn new() -> Self {
        Self {
            state: watch::channel(SequencerState::Idle).0,
        }
    }

    pub(crate) fn try_begin(&self, next: SequencerState) -> bool {
        self.state.send_if_modified(|state| {
            if *state == SequencerState::Idle {
                *state = next;
                true
            } else {
                false
            }
        })
    }

    pub(crate) fn set(&self, next: SequencerState) {
        let prev = self.state.send_replace(next);
        log::debug!("Action state {:?} -> {:?}", prev, next);
    }

    pub(crate) fn finish<T>(&self, res: &Result<T, VaultError>) {
        if res.is_err() {
            self.set(SequencerState::Failed);
        }
        self.set(SequencerState::Idle);
    }

    pub(crate) fn current(&self) -> SequencerState {
        *self.state.borrow()
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<SequencerState> {
        self.state.subscribe()
    }
}

/// Waits for an acknowledgment, bounded by the optional timeout
pub(crate) async fn acknowledged<F>(
    write: F,
    timeout: Option<Duration>,
) -> Result<WriteReceipt, VaultError>
where
    F: Future<Output = Result<WriteReceipt, VaultError>>,
{
    match timeout {
        Some(timeout) => tokio::time::timeout(timeout, write)
            .await
            .map_err(|_| err_create!(timeout))?,
        None => write.await,
    }
}

/// Runs deposit/mint/withdraw/redeem, raising the allowance first when needed.
///
/// A trigger moves through `Idle -> Checking -> [Approving] -> Acting -> Idle`. The approval
/// is acknowledged before the action write is issued, and a failed approval stops the flow.
pub struct ActionSequencer {
    client: Arc<dyn ContractClient>,
    settings: SequencerSettings,
    state: FlowState,
}

impl ActionSequencer {
    pub fn new(client: Arc<dyn ContractClient>, settings: SequencerSettings) -> Self {
        Self {
            client,
            settings,
            state: FlowState::new(),
        }
    }

    pub fn state(&self) -> SequencerState {
        self.state.current()
    }

    pub fn is_idle(&self) -> bool {
        self.state() == SequencerState::Idle
    }

    pub fn subscribe(&self) -> watch::Receiver<SequencerState> {
        self.state.subscribe()
    }

    pub async fn trigger(
        &self,
        kind: ActionKind,
        raw_amount: &str,
    ) -> Result<ActionOutcome, VaultError> {
        if raw_amount.is_empty() {
            return Ok(ActionOutcome::Skipped);
        }
        if !self.state.try_begin(SequencerState::Checking) {
            log::debug!("{} ignored, action already in progress", kind);
            return Ok(ActionOutcome::Ignored);
        }
        let res = self.run(kind, raw_amount).await;
        self.state.finish(&res);
        res
    }

    pub fn build_request(&self, kind: ActionKind, amount: U256) -> Result<ActionRequest, VaultError> {
        let actor = self
            .client
            .account()
            .ok_or(err_create!(FlowError::NoActor))?;
        let vault = self
            .client
            .deployed_info(ContractName::TestVault)
            .ok_or(err_create!(FlowError::NotDeployed(
                ContractName::TestVault.to_string()
            )))?
            .address;
        let asset = self
            .client
            .deployed_info(ContractName::TestToken)
            .ok_or(err_create!(FlowError::NotDeployed(
                ContractName::TestToken.to_string()
            )))?
            .address;
        Ok(ActionRequest {
            kind,
            amount,
            actor,
            vault,
            asset,
        })
    }

    async fn run(&self, kind: ActionKind, raw_amount: &str) -> Result<ActionOutcome, VaultError> {
        let amount = to_base_units(raw_amount)?;
        let request = self.build_request(kind, amount)?;

        let approval = if kind.requires_allowance()
            && needs_approval(
                self.client.as_ref(),
                Some(request.actor),
                request.vault,
                Some(request.amount),
            )
            .await?
        {
            Some(self.approve(&request).await?)
        } else {
            None
        };

        self.state.set(SequencerState::Acting);
        log::info!(
            "{} {} for {:#x}",
            kind,
            request.amount.to_eth_str(),
            request.actor
        );
        let action = acknowledged(
            self.client.write(
                ContractName::TestVault,
                kind.function_name(),
                request.args(),
            ),
            self.settings.action_timeout,
        )
        .await
        .map_err(|err| err_create!(FlowError::ActionFailed(err.to_string())))?;

        Ok(ActionOutcome::Completed { approval, action })
    }

    async fn approve(&self, request: &ActionRequest) -> Result<WriteReceipt, VaultError> {
        self.state.set(SequencerState::Approving);
        log::info!(
            "Allowance too low for {} {}, approving {} to {:#x}",
            request.kind,
            request.amount.to_eth_str(),
            self.settings.approval_ceiling.to_eth_str(),
            request.vault
        );
        let receipt = acknowledged(
            self.client.write(
                ContractName::TestToken,
                "approve",
                vec![
                    Token::Address(request.vault),
                    Token::Uint(self.settings.approval_ceiling),
                ],
            ),
            self.settings.action_timeout,
        )
        .await
        .map_err(|err| err_create!(FlowError::ApprovalFailed(err.to_string())))?;

        if self.settings.allowance_policy == AllowancePolicy::RecheckAndAbort {
            let allowance = check_allowance(
                self.client.as_ref(),
                AllowanceRequest {
                    owner: request.actor,
                    spender: request.vault,
                },
            )
            .await?;
            if request.amount > allowance {
                return Err(err_create!(FlowError::ApprovalFailed(format!(
                    "allowance {} still below {} after approval",
                    allowance.to_eth_str(),
                    request.amount.to_eth_str()
                ))));
            }
        }
        Ok(receipt)
    }
}
