mod actions;
mod options;

use crate::actions::balances::show_balances;
use crate::actions::console::run_console;
use crate::actions::vault_action::{
    check_allowance_local, donate_local, faucet_local, run_vault_action,
};
use crate::options::{VaultCommands, VaultOptions};
use erc4626_lib::client::ContractClient;
use erc4626_lib::config::Config;
use erc4626_lib::error::VaultError;
use erc4626_lib::eth::{load_private_key, Web3ContractClient};
use erc4626_lib::sequencer::{ActionKind, SequencerSettings};
use erc4626_lib::signer::{PrivateKeySigner, Signer};
use std::env;
use std::sync::Arc;
use structopt::StructOpt;

fn load_signer() -> Result<Option<Box<dyn Signer>>, VaultError> {
    match env::var("ETH_PRIVATE_KEY") {
        Ok(key) if !key.trim().is_empty() => {
            let signer = PrivateKeySigner::new(load_private_key(&key)?);
            log::info!("Eth account loaded: {:#x}", signer.address());
            Ok(Some(Box::new(signer)))
        }
        _ => {
            log::warn!("ETH_PRIVATE_KEY not set, running without account");
            Ok(None)
        }
    }
}

async fn main_internal() -> Result<(), VaultError> {
    dotenv::dotenv().ok();
    env::set_var(
        "RUST_LOG",
        env::var("RUST_LOG").unwrap_or("info,web3=warn".to_string()),
    );

    env_logger::init();
    let cli: VaultOptions = VaultOptions::from_args();

    let config = Config::load(cli.config.to_string_lossy().to_string()).await?;
    let client: Arc<dyn ContractClient> =
        Arc::new(Web3ContractClient::new(&config, load_signer()?)?);
    let settings = SequencerSettings::from(&config.actions);

    match cli.commands {
        VaultCommands::Balances { balances_options } => {
            show_balances(client.as_ref(), &config, balances_options.json).await?;
        }
        VaultCommands::Allowance { amount_options } => {
            check_allowance_local(client, settings, &amount_options.amount).await?;
        }
        VaultCommands::Deposit { amount_options } => {
            run_vault_action(client, settings, ActionKind::Deposit, &amount_options.amount)
                .await?;
        }
        VaultCommands::Mint { amount_options } => {
            run_vault_action(client, settings, ActionKind::Mint, &amount_options.amount).await?;
        }
        VaultCommands::Withdraw { amount_options } => {
            run_vault_action(client, settings, ActionKind::Withdraw, &amount_options.amount)
                .await?;
        }
        VaultCommands::Redeem { amount_options } => {
            run_vault_action(client, settings, ActionKind::Redeem, &amount_options.amount)
                .await?;
        }
        VaultCommands::Donate { amount_options } => {
            donate_local(client, settings, &amount_options.amount).await?;
        }
        VaultCommands::Faucet => {
            faucet_local(client, settings).await?;
        }
        VaultCommands::Console => {
            run_console(client, config, settings).await?;
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), VaultError> {
    match main_internal().await {
        Ok(_) => Ok(()),
        Err(e) => {
            eprintln!("Error: {e}");
            Err(e)
        }
    }
}
