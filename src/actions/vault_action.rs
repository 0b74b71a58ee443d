use erc4626_lib::client::ContractClient;
use erc4626_lib::control::{ActionControl, DonationControl, FaucetControl};
use erc4626_lib::error::{FlowError, VaultError};
use erc4626_lib::sequencer::{ActionKind, ActionOutcome, SequencerSettings};
use erc4626_lib::utils::U256ConvExt;
use erc4626_lib::{err_create, err_custom_create};
use std::sync::Arc;

fn print_outcome(label: &str, outcome: &ActionOutcome) {
    match outcome {
        ActionOutcome::Skipped => println!("{label}: nothing to submit"),
        ActionOutcome::Ignored => println!("{label}: another action is in progress"),
        ActionOutcome::Completed { approval, action } => {
            if let Some(approval) = approval {
                println!(
                    "{label}: approval acknowledged, tx: {:#x}",
                    approval.transaction_hash
                );
            }
            println!(
                "{label}: acknowledged, tx: {:#x}, block: {}",
                action.transaction_hash,
                action
                    .block_number
                    .map(|n| n.to_string())
                    .unwrap_or_default()
            );
        }
    }
}

pub async fn run_vault_action(
    client: Arc<dyn ContractClient>,
    settings: SequencerSettings,
    kind: ActionKind,
    amount: &str,
) -> Result<(), VaultError> {
    let control = ActionControl::new(kind, client, settings);
    if !control.on_change(amount).await {
        return Err(err_create!(FlowError::InvalidAmount(amount.to_string())));
    }
    let outcome = control.submit().await?;
    print_outcome(&kind.to_string(), &outcome);
    Ok(())
}

pub async fn check_allowance_local(
    client: Arc<dyn ContractClient>,
    settings: SequencerSettings,
    amount: &str,
) -> Result<(), VaultError> {
    let control = ActionControl::new(ActionKind::Deposit, client, settings);
    if !control.on_change(amount).await {
        return Err(err_create!(FlowError::InvalidAmount(amount.to_string())));
    }
    let needs_approval = control.monitor().recompute().await?;
    let allowance = control
        .monitor()
        .last_allowance()
        .await
        .map(|allowance| allowance.to_eth_str())
        .unwrap_or_else(|| "unknown".to_string());
    println!("Allowance: {allowance}, needs approval: {needs_approval}");
    Ok(())
}

pub async fn donate_local(
    client: Arc<dyn ContractClient>,
    settings: SequencerSettings,
    amount: &str,
) -> Result<(), VaultError> {
    let control = DonationControl::new(client, &settings);
    if !control.on_change(amount) {
        return Err(err_custom_create!("Invalid donation amount {amount}"));
    }
    let outcome = control.submit().await?;
    print_outcome("Donation", &outcome);
    Ok(())
}

pub async fn faucet_local(
    client: Arc<dyn ContractClient>,
    settings: SequencerSettings,
) -> Result<(), VaultError> {
    let control = FaucetControl::new(client, &settings);
    let outcome = control.submit().await?;
    print_outcome("Faucet", &outcome);
    Ok(())
}
