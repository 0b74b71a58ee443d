use crate::actions::{DonationAction, FaucetAction};
use crate::allowance::AllowanceMonitor;
use crate::amount::AmountInput;
use crate::client::ContractClient;
use crate::contracts::ContractName;
use crate::error::VaultError;
use crate::sequencer::{ActionKind, ActionOutcome, ActionSequencer, SequencerSettings, SequencerState};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::watch;

// Controls are what a front-end binds to: a text value, change and submit handlers and
// a disabled flag that is set exactly while the flow behind the control is not Idle.
// `on_submit` follows a fire-and-log policy: failures are logged and never returned, the
// caller only sees the disabled flag drop. `submit` returns the underlying result.

pub struct ActionControl {
    kind: ActionKind,
    input: Mutex<AmountInput>,
    sequencer: ActionSequencer,
    monitor: AllowanceMonitor,
}

impl ActionControl {
    pub fn new(kind: ActionKind, client: Arc<dyn ContractClient>, settings: SequencerSettings) -> Self {
        let spender = client
            .deployed_info(ContractName::TestVault)
            .map(|info| info.address);
        Self {
            kind,
            input: Mutex::new(AmountInput::new()),
            monitor: AllowanceMonitor::new(client.clone(), spender),
            sequencer: ActionSequencer::new(client, settings),
        }
    }

    pub fn value(&self) -> String {
        self.input.lock().value().to_string()
    }

    pub fn disabled(&self) -> bool {
        !self.sequencer.is_idle()
    }

    pub fn needs_approval(&self) -> bool {
        self.kind.requires_allowance() && self.monitor.needs_approval()
    }

    pub fn subscribe_needs_approval(&self) -> watch::Receiver<bool> {
        self.monitor.subscribe()
    }

    pub fn sequencer(&self) -> &ActionSequencer {
        &self.sequencer
    }

    pub fn monitor(&self) -> &AllowanceMonitor {
        &self.monitor
    }

    /// Returns false when the text was rejected and the previous value kept
    pub async fn on_change(&self, raw: &str) -> bool {
        let amount = {
            let mut input = self.input.lock();
            if !input.on_change(raw) {
                return false;
            }
            input.base_units()
        };
        if self.kind.requires_allowance() {
            let amount = amount.and_then(Result::ok);
            if let Err(err) = self.monitor.set_amount(amount).await {
                log::warn!("Cannot check allowance for {}: {}", self.kind, err);
            }
        }
        true
    }

    pub async fn submit(&self) -> Result<ActionOutcome, VaultError> {
        let raw = self.value();
        let res = self.sequencer.trigger(self.kind, &raw).await;
        if let Ok(ActionOutcome::Completed { .. }) = &res {
            let cleared = self.input.lock().clear_if_unchanged(&raw);
            if self.kind.requires_allowance() {
                if cleared {
                    self.monitor.set_amount(None).await?;
                } else {
                    self.monitor.allowance_changed().await?;
                }
            }
        }
        res
    }

    pub async fn on_submit(&self) {
        if let Err(err) = self.submit().await {
            log::error!("Error during {}: {}", self.kind, err);
        }
    }
}

pub struct DonationControl {
    input: Mutex<AmountInput>,
    action: DonationAction,
}

impl DonationControl {
    pub fn new(client: Arc<dyn ContractClient>, settings: &SequencerSettings) -> Self {
        Self {
            input: Mutex::new(AmountInput::new()),
            action: DonationAction::new(client, settings.action_timeout),
        }
    }

    pub fn value(&self) -> String {
        self.input.lock().value().to_string()
    }

    pub fn disabled(&self) -> bool {
        !matches!(self.action.state(), SequencerState::Idle)
    }

    pub fn on_change(&self, raw: &str) -> bool {
        self.input.lock().on_change(raw)
    }

    pub async fn submit(&self) -> Result<ActionOutcome, VaultError> {
        let raw = self.value();
        let res = self.action.trigger(&raw).await;
        if let Ok(ActionOutcome::Completed { .. }) = &res {
            self.input.lock().clear_if_unchanged(&raw);
        }
        res
    }

    pub async fn on_submit(&self) {
        if let Err(err) = self.submit().await {
            log::error!("Error during donation: {}", err);
        }
    }
}

pub struct FaucetControl {
    action: FaucetAction,
}

impl FaucetControl {
    pub fn new(client: Arc<dyn ContractClient>, settings: &SequencerSettings) -> Self {
        Self {
            action: FaucetAction::new(client, settings.action_timeout),
        }
    }

    pub fn disabled(&self) -> bool {
        !matches!(self.action.state(), SequencerState::Idle)
    }

    pub async fn submit(&self) -> Result<ActionOutcome, VaultError> {
        self.action.trigger().await
    }

    pub async fn on_submit(&self) {
        if let Err(err) = self.submit().await {
            log::error!("Error during faucet: {}", err);
        }
    }
}
