use erc4626_lib::balances::TokenBalances;
use erc4626_lib::client::ContractClient;
use erc4626_lib::config::Config;
use erc4626_lib::err_custom_create;
use erc4626_lib::error::VaultError;

pub async fn load_balances(
    client: &dyn ContractClient,
    config: &Config,
) -> Result<TokenBalances, VaultError> {
    Ok(TokenBalances::load(client, client.account())
        .await?
        .with_block_explorer(config.chain.block_explorer_url.clone()))
}

pub async fn show_balances(
    client: &dyn ContractClient,
    config: &Config,
    json: bool,
) -> Result<(), VaultError> {
    let balances = load_balances(client, config).await?;
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&balances).map_err(|err| err_custom_create!(
                "Something went wrong when serializing to json {err}"
            ))?
        );
    } else {
        println!("{balances}");
    }
    Ok(())
}
