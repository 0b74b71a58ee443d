use std::path::PathBuf;

use structopt::StructOpt;

#[derive(StructOpt)]
#[structopt(about = "Amount options")]
pub struct AmountOptions {
    #[structopt(
        short = "a",
        long = "amount",
        help = "Amount (decimal, full precision, i.e. 0.01)"
    )]
    pub amount: String,
}

#[derive(StructOpt)]
#[structopt(about = "Balances options")]
pub struct BalancesOptions {
    #[structopt(long = "json", help = "Print balances as json")]
    pub json: bool,
}

#[derive(StructOpt)]
pub enum VaultCommands {
    #[structopt(about = "Show vault and asset balances of the account")]
    Balances {
        #[structopt(flatten)]
        balances_options: BalancesOptions,
    },
    #[structopt(about = "Check if depositing the amount needs an approval first")]
    Allowance {
        #[structopt(flatten)]
        amount_options: AmountOptions,
    },
    #[structopt(about = "Deposit assets into the vault (approves first when needed)")]
    Deposit {
        #[structopt(flatten)]
        amount_options: AmountOptions,
    },
    #[structopt(about = "Mint vault shares (approves first when needed)")]
    Mint {
        #[structopt(flatten)]
        amount_options: AmountOptions,
    },
    #[structopt(about = "Withdraw assets from the vault")]
    Withdraw {
        #[structopt(flatten)]
        amount_options: AmountOptions,
    },
    #[structopt(about = "Redeem vault shares")]
    Redeem {
        #[structopt(flatten)]
        amount_options: AmountOptions,
    },
    #[structopt(about = "Donate assets to the vault")]
    Donate {
        #[structopt(flatten)]
        amount_options: AmountOptions,
    },
    #[structopt(about = "Get test tokens from the asset faucet")]
    Faucet,
    #[structopt(about = "Interactive console with all actions")]
    Console,
}

#[derive(StructOpt)]
#[structopt(about = "ERC-4626 vault console")]
pub struct VaultOptions {
    #[structopt(
        long = "config",
        help = "Config file",
        env = "VAULT_CONFIG",
        default_value = "config-vault.toml"
    )]
    pub config: PathBuf,

    #[structopt(subcommand)]
    pub commands: VaultCommands,
}
