use erc4626_lib::config::AllowancePolicy;
use erc4626_lib::contracts::ContractName;
use erc4626_lib::error::FlowError;
use erc4626_lib::sequencer::{
    ActionKind, ActionOutcome, ActionSequencer, SequencerSettings, SequencerState,
};
use erc4626_lib_test::{
    eth, test_actor, test_vault, CallKind, MockContractClient, RecordedCall,
};
use std::sync::Arc;
use std::time::Duration;
use web3::ethabi::Token;

fn approve_call() -> RecordedCall {
    RecordedCall {
        kind: CallKind::Write,
        contract: ContractName::TestToken,
        function: "approve".to_string(),
        args: vec![
            Token::Address(test_vault()),
            Token::Uint(eth(900_000_000)),
        ],
    }
}

fn allowance_read() -> RecordedCall {
    RecordedCall {
        kind: CallKind::Read,
        contract: ContractName::TestToken,
        function: "allowance".to_string(),
        args: vec![Token::Address(test_actor()), Token::Address(test_vault())],
    }
}

fn vault_write(function: &str, args: Vec<Token>) -> RecordedCall {
    RecordedCall {
        kind: CallKind::Write,
        contract: ContractName::TestVault,
        function: function.to_string(),
        args,
    }
}

#[tokio::test]
async fn test_deposit_without_allowance_approves_first() -> anyhow::Result<()> {
    let client = Arc::new(MockContractClient::default());
    let sequencer = ActionSequencer::new(client.clone(), SequencerSettings::default());

    let outcome = sequencer.trigger(ActionKind::Deposit, "100").await?;

    assert!(matches!(
        outcome,
        ActionOutcome::Completed {
            approval: Some(_),
            ..
        }
    ));
    assert_eq!(
        client.calls(),
        vec![
            allowance_read(),
            approve_call(),
            allowance_read(),
            vault_write(
                "deposit",
                vec![Token::Uint(eth(100)), Token::Address(test_actor())]
            ),
        ]
    );
    assert_eq!(sequencer.state(), SequencerState::Idle);
    Ok(())
}

#[tokio::test]
async fn test_deposit_with_enough_allowance_skips_approval() -> anyhow::Result<()> {
    let client = Arc::new(MockContractClient::default());
    client.set_allowance(test_actor(), test_vault(), eth(500));
    let sequencer = ActionSequencer::new(client.clone(), SequencerSettings::default());

    let outcome = sequencer.trigger(ActionKind::Deposit, "100").await?;

    assert!(matches!(
        outcome,
        ActionOutcome::Completed { approval: None, .. }
    ));
    assert_eq!(
        client.calls(),
        vec![
            allowance_read(),
            vault_write(
                "deposit",
                vec![Token::Uint(eth(100)), Token::Address(test_actor())]
            ),
        ]
    );
    Ok(())
}

#[tokio::test]
async fn test_allowance_equal_to_amount_is_enough() -> anyhow::Result<()> {
    let client = Arc::new(MockContractClient::default());
    client.set_allowance(test_actor(), test_vault(), eth(100));
    let sequencer = ActionSequencer::new(client.clone(), SequencerSettings::default());

    sequencer.trigger(ActionKind::Mint, "100").await?;

    assert_eq!(client.write_functions(), vec!["mint"]);
    Ok(())
}

#[tokio::test]
async fn test_mint_without_allowance_approves_first() -> anyhow::Result<()> {
    let client = Arc::new(MockContractClient::default());
    let sequencer = ActionSequencer::new(client.clone(), SequencerSettings::default());

    sequencer.trigger(ActionKind::Mint, "0.25").await?;

    let writes = client.writes();
    assert_eq!(writes.len(), 2);
    assert_eq!(writes[0], approve_call());
    assert_eq!(
        writes[1],
        vault_write(
            "mint",
            vec![
                Token::Uint(eth(1) / web3::types::U256::from(4)),
                Token::Address(test_actor())
            ]
        )
    );
    Ok(())
}

#[tokio::test]
async fn test_empty_amount_is_a_no_op() -> anyhow::Result<()> {
    let client = Arc::new(MockContractClient::default());
    let sequencer = ActionSequencer::new(client.clone(), SequencerSettings::default());

    for kind in ActionKind::ALL {
        assert_eq!(sequencer.trigger(kind, "").await?, ActionOutcome::Skipped);
    }

    assert!(client.calls().is_empty());
    assert_eq!(sequencer.state(), SequencerState::Idle);
    Ok(())
}

#[tokio::test]
async fn test_withdraw_and_redeem_never_touch_allowance() -> anyhow::Result<()> {
    let client = Arc::new(MockContractClient::default());
    let sequencer = ActionSequencer::new(client.clone(), SequencerSettings::default());

    sequencer.trigger(ActionKind::Withdraw, "50").await?;
    sequencer.trigger(ActionKind::Redeem, "7").await?;

    assert_eq!(
        client.calls(),
        vec![
            vault_write(
                "withdraw",
                vec![
                    Token::Uint(eth(50)),
                    Token::Address(test_actor()),
                    Token::Address(test_actor())
                ]
            ),
            vault_write(
                "redeem",
                vec![
                    Token::Uint(eth(7)),
                    Token::Address(test_actor()),
                    Token::Address(test_actor())
                ]
            ),
        ]
    );
    Ok(())
}

#[tokio::test]
async fn test_rejected_approval_stops_the_flow() -> anyhow::Result<()> {
    let client = Arc::new(MockContractClient::default());
    client.reject("approve");
    let sequencer = ActionSequencer::new(client.clone(), SequencerSettings::default());

    let err = sequencer
        .trigger(ActionKind::Deposit, "100")
        .await
        .unwrap_err();

    assert!(matches!(
        err.flow_error(),
        Some(FlowError::ApprovalFailed(_))
    ));
    assert_eq!(client.write_functions(), vec!["approve"]);
    assert_eq!(sequencer.state(), SequencerState::Idle);
    Ok(())
}

#[tokio::test]
async fn test_rejected_action_returns_to_idle() -> anyhow::Result<()> {
    let client = Arc::new(MockContractClient::default());
    client.reject("deposit");
    client.set_allowance(test_actor(), test_vault(), eth(1000));
    let sequencer = ActionSequencer::new(client.clone(), SequencerSettings::default());

    let err = sequencer
        .trigger(ActionKind::Deposit, "1")
        .await
        .unwrap_err();
    assert!(matches!(err.flow_error(), Some(FlowError::ActionFailed(_))));
    assert_eq!(sequencer.state(), SequencerState::Idle);

    // no retry, but the next trigger runs normally
    sequencer.trigger(ActionKind::Withdraw, "1").await?;
    assert_eq!(client.write_functions(), vec!["deposit", "withdraw"]);
    Ok(())
}

#[tokio::test]
async fn test_invalid_amount_makes_no_calls() -> anyhow::Result<()> {
    let client = Arc::new(MockContractClient::default());
    let sequencer = ActionSequencer::new(client.clone(), SequencerSettings::default());

    for raw in [".", "1.2.3", "abc"] {
        let err = sequencer.trigger(ActionKind::Deposit, raw).await.unwrap_err();
        assert_eq!(
            err.flow_error(),
            Some(&FlowError::InvalidAmount(raw.to_string()))
        );
    }

    assert!(client.calls().is_empty());
    assert_eq!(sequencer.state(), SequencerState::Idle);
    Ok(())
}

#[tokio::test]
async fn test_missing_account_or_deployment() -> anyhow::Result<()> {
    let client = Arc::new(MockContractClient::new(None));
    let sequencer = ActionSequencer::new(client.clone(), SequencerSettings::default());
    let err = sequencer.trigger(ActionKind::Redeem, "1").await.unwrap_err();
    assert_eq!(err.flow_error(), Some(&FlowError::NoActor));
    assert!(client.calls().is_empty());

    let client = Arc::new(MockContractClient::default().without_deployment(ContractName::TestVault));
    let sequencer = ActionSequencer::new(client.clone(), SequencerSettings::default());
    let err = sequencer.trigger(ActionKind::Deposit, "1").await.unwrap_err();
    assert_eq!(
        err.flow_error(),
        Some(&FlowError::NotDeployed("TestVault".to_string()))
    );
    assert!(client.calls().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_recheck_aborts_when_approval_did_not_land() -> anyhow::Result<()> {
    let client = Arc::new(MockContractClient::default());
    client.ignore_approvals();
    let sequencer = ActionSequencer::new(client.clone(), SequencerSettings::default());

    let err = sequencer
        .trigger(ActionKind::Deposit, "100")
        .await
        .unwrap_err();

    assert!(matches!(
        err.flow_error(),
        Some(FlowError::ApprovalFailed(msg)) if msg.contains("still below")
    ));
    assert_eq!(client.write_functions(), vec!["approve"]);
    Ok(())
}

#[tokio::test]
async fn test_trust_and_proceed_skips_recheck() -> anyhow::Result<()> {
    let client = Arc::new(MockContractClient::default());
    client.ignore_approvals();
    let settings = SequencerSettings {
        allowance_policy: AllowancePolicy::TrustAndProceed,
        ..Default::default()
    };
    let sequencer = ActionSequencer::new(client.clone(), settings);

    sequencer.trigger(ActionKind::Deposit, "100").await?;

    assert_eq!(client.write_functions(), vec!["approve", "deposit"]);
    assert_eq!(client.reads().len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_retrigger_while_in_flight_is_ignored() -> anyhow::Result<()> {
    let client = Arc::new(MockContractClient::default());
    client.hold_writes();
    let sequencer = Arc::new(ActionSequencer::new(
        client.clone(),
        SequencerSettings::default(),
    ));
    let mut state_rx = sequencer.subscribe();

    let first = {
        let sequencer = sequencer.clone();
        tokio::spawn(async move { sequencer.trigger(ActionKind::Deposit, "100").await })
    };

    state_rx
        .wait_for(|state| *state == SequencerState::Approving)
        .await?;
    assert_eq!(
        sequencer.trigger(ActionKind::Deposit, "100").await?,
        ActionOutcome::Ignored
    );
    assert_eq!(
        sequencer.trigger(ActionKind::Withdraw, "1").await?,
        ActionOutcome::Ignored
    );
    assert_eq!(client.write_functions(), vec!["approve"]);

    client.release_writes(1);
    state_rx
        .wait_for(|state| *state == SequencerState::Acting)
        .await?;
    assert_eq!(
        sequencer.trigger(ActionKind::Mint, "1").await?,
        ActionOutcome::Ignored
    );
    assert_eq!(client.write_functions(), vec!["approve", "deposit"]);

    client.release_writes(1);
    let outcome = first.await??;
    assert!(matches!(outcome, ActionOutcome::Completed { .. }));
    assert_eq!(client.write_functions(), vec!["approve", "deposit"]);
    assert_eq!(sequencer.state(), SequencerState::Idle);
    Ok(())
}

#[tokio::test]
async fn test_unacknowledged_approval_times_out() -> anyhow::Result<()> {
    let client = Arc::new(MockContractClient::default());
    client.hold_writes();
    let settings = SequencerSettings {
        action_timeout: Some(Duration::from_millis(50)),
        ..Default::default()
    };
    let sequencer = ActionSequencer::new(client.clone(), settings);

    let err = sequencer
        .trigger(ActionKind::Deposit, "100")
        .await
        .unwrap_err();

    assert!(matches!(
        err.flow_error(),
        Some(FlowError::ApprovalFailed(msg)) if msg.contains("Time limit reached")
    ));
    assert_eq!(client.write_functions(), vec!["approve"]);
    assert_eq!(sequencer.state(), SequencerState::Idle);
    Ok(())
}
