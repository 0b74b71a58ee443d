use crate::client::ContractClient;
use crate::contracts::ContractName;
use crate::error::*;
use crate::err_custom_create;
use std::sync::Arc;
use tokio::sync::{watch, Mutex};
use web3::ethabi::Token;
use web3::types::{Address, U256};

/// Allowance of `owner` towards `spender` on the vault asset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllowanceRequest {
    pub owner: Address,
    pub spender: Address,
}

pub async fn check_allowance(
    client: &dyn ContractClient,
    request: AllowanceRequest,
) -> Result<U256, VaultError> {
    let res = client
        .read(
            ContractName::TestToken,
            "allowance",
            vec![Token::Address(request.owner), Token::Address(request.spender)],
        )
        .await
        .map_err(|err| {
            err_custom_create!("Allowance check failed for {:#x}: {}", request.owner, err)
        })?;
    let allowance = res
        .into_iter()
        .next()
        .and_then(|token| token.into_uint())
        .ok_or_else(|| err_custom_create!("Invalid response from ERC20 allowance check"))?;
    log::debug!(
        "Check allowance: owner: {:#x}, spender: {:#x}, allowance: {}",
        request.owner,
        request.spender,
        allowance
    );
    Ok(allowance)
}

/// True when `amount` exceeds the current allowance of `actor` towards `spender`.
///
/// Without an actor, or for an empty or zero amount, no approval is ever needed and no
/// read is issued.
pub async fn needs_approval(
    client: &dyn ContractClient,
    actor: Option<Address>,
    spender: Address,
    amount: Option<U256>,
) -> Result<bool, VaultError> {
    let (Some(owner), Some(amount)) = (actor, amount) else {
        return Ok(false);
    };
    if amount.is_zero() {
        return Ok(false);
    }
    let allowance = check_allowance(client, AllowanceRequest { owner, spender }).await?;
    Ok(amount > allowance)
}

#[derive(Debug, Default)]
struct MonitorState {
    actor: Option<Address>,
    spender: Option<Address>,
    amount: Option<U256>,
    last_allowance: Option<U256>,
}

/// Keeps the needs-approval flag of one action surface up to date.
///
/// Every setter is a change notification: it updates its input and re-evaluates the flag,
/// which is then published to subscribers. Each re-evaluation with a known actor, spender
/// and non-zero amount reads the allowance again, so approvals issued through any other
/// surface are picked up on the next change.
pub struct AllowanceMonitor {
    client: Arc<dyn ContractClient>,
    state: Mutex<MonitorState>,
    flag: watch::Sender<bool>,
}

impl AllowanceMonitor {
    pub fn new(client: Arc<dyn ContractClient>, spender: Option<Address>) -> Self {
        let actor = client.account();
        Self {
            client,
            state: Mutex::new(MonitorState {
                actor,
                spender,
                ..Default::default()
            }),
            flag: watch::channel(false).0,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.flag.subscribe()
    }

    /// Last computed value
    pub fn needs_approval(&self) -> bool {
        *self.flag.borrow()
    }

    /// Allowance seen by the last re-evaluation that read it
    pub async fn last_allowance(&self) -> Option<U256> {
        self.state.lock().await.last_allowance
    }

    pub async fn set_actor(&self, actor: Option<Address>) -> Result<bool, VaultError> {
        let mut state = self.state.lock().await;
        if state.actor != actor {
            state.actor = actor;
            state.last_allowance = None;
        }
        self.recompute_locked(&mut state).await
    }

    pub async fn set_spender(&self, spender: Option<Address>) -> Result<bool, VaultError> {
        let mut state = self.state.lock().await;
        if state.spender != spender {
            state.spender = spender;
            state.last_allowance = None;
        }
        self.recompute_locked(&mut state).await
    }

    pub async fn set_amount(&self, amount: Option<U256>) -> Result<bool, VaultError> {
        let mut state = self.state.lock().await;
        state.amount = amount;
        self.recompute_locked(&mut state).await
    }

    /// The on-chain allowance may have moved (e.g. after an approval)
    pub async fn allowance_changed(&self) -> Result<bool, VaultError> {
        self.recompute().await
    }

    pub async fn recompute(&self) -> Result<bool, VaultError> {
        let mut state = self.state.lock().await;
        self.recompute_locked(&mut state).await
    }

    async fn recompute_locked(&self, state: &mut MonitorState) -> Result<bool, VaultError> {
        let needs_approval = match (state.actor, state.spender, state.amount) {
            (Some(owner), Some(spender), Some(amount)) if !amount.is_zero() => {
                let request = AllowanceRequest { owner, spender };
                match check_allowance(self.client.as_ref(), request).await {
                    Ok(allowance) => {
                        state.last_allowance = Some(allowance);
                        amount > allowance
                    }
                    Err(err) => {
                        self.flag.send_replace(false);
                        return Err(err);
                    }
                }
            }
            _ => false,
        };
        self.flag.send_if_modified(|flag| {
            let changed = *flag != needs_approval;
            *flag = needs_approval;
            changed
        });
        Ok(needs_approval)
    }
}
