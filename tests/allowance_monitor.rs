use erc4626_lib::allowance::{needs_approval, AllowanceMonitor};
use erc4626_lib::contracts::ContractName;
use erc4626_lib_test::{eth, test_actor, test_vault, MockContractClient};
use std::sync::Arc;
use web3::types::{Address, U256};

#[tokio::test]
async fn test_needs_approval_without_inputs_makes_no_read() -> anyhow::Result<()> {
    let client = MockContractClient::default();

    assert!(!needs_approval(&client, None, test_vault(), Some(eth(1))).await?);
    assert!(!needs_approval(&client, Some(test_actor()), test_vault(), None).await?);
    assert!(!needs_approval(&client, Some(test_actor()), test_vault(), Some(U256::zero())).await?);

    assert!(client.calls().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_needs_approval_compares_strictly() -> anyhow::Result<()> {
    let client = MockContractClient::default();
    client.set_allowance(test_actor(), test_vault(), eth(100));

    let actor = Some(test_actor());
    assert!(!needs_approval(&client, actor, test_vault(), Some(eth(99))).await?);
    assert!(!needs_approval(&client, actor, test_vault(), Some(eth(100))).await?);
    assert!(needs_approval(&client, actor, test_vault(), Some(eth(100) + U256::one())).await?);
    assert_eq!(client.reads().len(), 3);
    Ok(())
}

#[tokio::test]
async fn test_needs_approval_propagates_read_failure() -> anyhow::Result<()> {
    let client = MockContractClient::default();
    client.reject("allowance");

    let err = needs_approval(&client, Some(test_actor()), test_vault(), Some(eth(1)))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Allowance check failed for"));
    assert!(err.to_string().contains("allowance rejected by mock"));
    Ok(())
}

#[tokio::test]
async fn test_monitor_reads_on_every_amount_change() -> anyhow::Result<()> {
    let client = Arc::new(MockContractClient::default());
    client.set_allowance(test_actor(), test_vault(), eth(50));
    let monitor = AllowanceMonitor::new(client.clone(), Some(test_vault()));
    let mut flag = monitor.subscribe();

    assert!(monitor.set_amount(Some(eth(100))).await?);
    assert!(monitor.needs_approval());
    assert!(flag.has_changed()?);
    assert!(*flag.borrow_and_update());
    assert_eq!(monitor.last_allowance().await, Some(eth(50)));

    assert!(!monitor.set_amount(Some(eth(20))).await?);
    assert!(!monitor.set_amount(Some(eth(50))).await?);
    assert!(!monitor.needs_approval());
    assert_eq!(client.reads().len(), 3);
    Ok(())
}

#[tokio::test]
async fn test_monitor_sees_allowance_raised_elsewhere() -> anyhow::Result<()> {
    let client = Arc::new(MockContractClient::default());
    let monitor = AllowanceMonitor::new(client.clone(), Some(test_vault()));

    assert!(monitor.set_amount(Some(eth(10))).await?);
    client.set_allowance(test_actor(), test_vault(), eth(10));
    assert!(!monitor.set_amount(Some(eth(9))).await?);
    assert!(!monitor.allowance_changed().await?);
    assert_eq!(monitor.last_allowance().await, Some(eth(10)));
    assert_eq!(client.reads().len(), 3);
    Ok(())
}

#[tokio::test]
async fn test_monitor_follows_actor_change() -> anyhow::Result<()> {
    let other = Address::from_low_u64_be(0x1234);
    let client = Arc::new(MockContractClient::default());
    client.set_allowance(test_actor(), test_vault(), eth(1000));
    let monitor = AllowanceMonitor::new(client.clone(), Some(test_vault()));

    assert!(!monitor.set_amount(Some(eth(1))).await?);
    assert!(monitor.set_actor(Some(other)).await?);
    assert_eq!(monitor.last_allowance().await, Some(U256::zero()));

    // disconnected: false without reading
    assert!(!monitor.set_actor(None).await?);
    assert_eq!(client.reads().len(), 2);
    Ok(())
}

#[tokio::test]
async fn test_monitor_without_spender_or_amount() -> anyhow::Result<()> {
    let client = Arc::new(MockContractClient::default().without_deployment(ContractName::TestVault));
    let monitor = AllowanceMonitor::new(client.clone(), None);

    assert!(!monitor.set_amount(Some(eth(1))).await?);
    assert!(monitor.set_spender(Some(test_vault())).await?);
    assert!(!monitor.set_amount(Some(U256::zero())).await?);
    assert!(!monitor.set_amount(None).await?);
    assert_eq!(client.reads().len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_monitor_read_failure_clears_flag() -> anyhow::Result<()> {
    let client = Arc::new(MockContractClient::default());
    let monitor = AllowanceMonitor::new(client.clone(), Some(test_vault()));
    assert!(monitor.set_amount(Some(eth(1))).await?);

    client.reject("allowance");
    assert!(monitor.allowance_changed().await.is_err());
    assert!(!monitor.needs_approval());
    Ok(())
}
