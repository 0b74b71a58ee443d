use crate::actions::balances::load_balances;
use erc4626_lib::client::ContractClient;
use erc4626_lib::config::Config;
use erc4626_lib::control::{ActionControl, DonationControl, FaucetControl};
use erc4626_lib::err_from;
use erc4626_lib::error::VaultError;
use erc4626_lib::sequencer::{ActionKind, SequencerSettings};
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Debug, PartialEq, Eq)]
enum ConsoleCommand {
    Balances,
    Status,
    Faucet,
    Donate(Option<String>),
    Action(ActionKind, Option<String>),
    Help,
    Quit,
}

fn parse_console_command(line: &str) -> Result<ConsoleCommand, String> {
    let mut parts = line.split_whitespace();
    let Some(command) = parts.next() else {
        return Err("empty command".to_string());
    };
    let amount = parts.next().map(|a| a.to_string());
    if let Some(extra) = parts.next() {
        return Err(format!("unexpected argument {extra}"));
    }
    match command.to_lowercase().as_str() {
        "balances" | "b" => Ok(ConsoleCommand::Balances),
        "status" | "s" => Ok(ConsoleCommand::Status),
        "faucet" => Ok(ConsoleCommand::Faucet),
        "donate" | "donation" => Ok(ConsoleCommand::Donate(amount)),
        "help" | "?" => Ok(ConsoleCommand::Help),
        "quit" | "exit" | "q" => Ok(ConsoleCommand::Quit),
        other => ActionKind::from_str(other).map(|kind| ConsoleCommand::Action(kind, amount)),
    }
}

const HELP: &str = "\
commands:
  balances                  show balances
  status                    show typed amounts and pending actions
  faucet                    get test tokens
  donate [amount]           donate assets to the vault
  deposit|mint [amount]     approve when needed, then deposit/mint
  withdraw|redeem [amount]  withdraw assets / redeem shares
  quit
an action without amount submits the amount typed before";

/// All controls of the vault page. Submits run as spawned tasks so the console keeps
/// reading commands while an action waits for acknowledgment.
struct ConsolePage {
    client: Arc<dyn ContractClient>,
    config: Config,
    controls: HashMap<ActionKind, Arc<ActionControl>>,
    donation: Arc<DonationControl>,
    faucet: Arc<FaucetControl>,
}

impl ConsolePage {
    fn new(client: Arc<dyn ContractClient>, config: Config, settings: SequencerSettings) -> Self {
        let controls = ActionKind::ALL
            .into_iter()
            .map(|kind| {
                (
                    kind,
                    Arc::new(ActionControl::new(kind, client.clone(), settings.clone())),
                )
            })
            .collect();
        Self {
            donation: Arc::new(DonationControl::new(client.clone(), &settings)),
            faucet: Arc::new(FaucetControl::new(client.clone(), &settings)),
            client,
            config,
            controls,
        }
    }

    fn print_status(&self) {
        for kind in ActionKind::ALL {
            if let Some(control) = self.controls.get(&kind) {
                println!(
                    "{:<9} value: {:<12} {}{}",
                    kind.to_string(),
                    control.value(),
                    if control.disabled() { "pending" } else { "idle" },
                    if control.needs_approval() {
                        ", needs approval"
                    } else {
                        ""
                    }
                );
            }
        }
        println!(
            "{:<9} value: {:<12} {}",
            "Donation",
            self.donation.value(),
            if self.donation.disabled() { "pending" } else { "idle" }
        );
        println!(
            "{:<9} {:<19} {}",
            "Faucet",
            "",
            if self.faucet.disabled() { "pending" } else { "idle" }
        );
    }

    async fn handle(&self, command: ConsoleCommand) -> Result<bool, VaultError> {
        match command {
            ConsoleCommand::Balances => {
                println!("{}", load_balances(self.client.as_ref(), &self.config).await?);
            }
            ConsoleCommand::Status => self.print_status(),
            ConsoleCommand::Help => println!("{HELP}"),
            ConsoleCommand::Quit => return Ok(false),
            ConsoleCommand::Faucet => {
                if self.faucet.disabled() {
                    println!("Faucet is pending");
                } else {
                    let faucet = self.faucet.clone();
                    tokio::spawn(async move { faucet.on_submit().await });
                }
            }
            ConsoleCommand::Donate(amount) => {
                if let Some(amount) = amount {
                    if !self.donation.on_change(&amount) {
                        println!("Invalid amount {amount}, keeping {:?}", self.donation.value());
                        return Ok(true);
                    }
                }
                if self.donation.disabled() {
                    println!("Donation is pending");
                } else {
                    let donation = self.donation.clone();
                    tokio::spawn(async move { donation.on_submit().await });
                }
            }
            ConsoleCommand::Action(kind, amount) => {
                let Some(control) = self.controls.get(&kind).cloned() else {
                    return Ok(true);
                };
                if let Some(amount) = amount {
                    if !control.on_change(&amount).await {
                        println!("Invalid amount {amount}, keeping {:?}", control.value());
                        return Ok(true);
                    }
                }
                if control.disabled() {
                    println!("{kind} is pending");
                } else {
                    if control.needs_approval() {
                        println!("{kind} needs approval first");
                    }
                    tokio::spawn(async move { control.on_submit().await });
                }
            }
        }
        Ok(true)
    }
}

pub async fn run_console(
    client: Arc<dyn ContractClient>,
    config: Config,
    settings: SequencerSettings,
) -> Result<(), VaultError> {
    if client.account().is_none() {
        log::warn!("No account connected, actions will fail");
    }
    let page = ConsolePage::new(client, config, settings);
    println!("{}", load_balances(page.client.as_ref(), &page.config).await?);
    println!("{HELP}");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.map_err(err_from!())? {
        if line.trim().is_empty() {
            continue;
        }
        match parse_console_command(&line) {
            Ok(command) => match page.handle(command).await {
                Ok(true) => {}
                Ok(false) => break,
                Err(err) => log::error!("{err}"),
            },
            Err(err) => println!("{err}, type help for commands"),
        }
    }
    Ok(())
}
