use crate::accounts::{test_actor, test_asset, test_vault};
use erc4626_lib::client::{ContractClient, DeployedInfo, WriteReceipt};
use erc4626_lib::contracts::ContractName;
use erc4626_lib::error::{TransactionFailedError, VaultError};
use erc4626_lib::{err_create, err_custom_create};
use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::Semaphore;
use web3::ethabi::Token;
use web3::types::{Address, H256, U256};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    Read,
    Write,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub kind: CallKind,
    pub contract: ContractName,
    pub function: String,
    pub args: Vec<Token>,
}

#[derive(Default)]
struct MockState {
    calls: Vec<RecordedCall>,
    allowances: HashMap<(Address, Address), U256>,
    balances: HashMap<(ContractName, Address), U256>,
    uint_views: HashMap<(ContractName, String), U256>,
    rejected: HashSet<String>,
    ignore_approvals: bool,
    gate: Option<Arc<Semaphore>>,
    tx_counter: u64,
}

/// In-memory contract client recording every call in issue order.
///
/// `approve` writes update the allowance table, functions can be made to fail, and
/// writes can be parked behind a gate to observe the in-flight states of a flow.
pub struct MockContractClient {
    account: Option<Address>,
    deployments: BTreeMap<ContractName, Address>,
    state: Mutex<MockState>,
}

impl Default for MockContractClient {
    fn default() -> Self {
        Self::new(Some(test_actor()))
    }
}

impl MockContractClient {
    pub fn new(account: Option<Address>) -> Self {
        let mut deployments = BTreeMap::new();
        deployments.insert(ContractName::TestVault, test_vault());
        deployments.insert(ContractName::TestToken, test_asset());
        Self {
            account,
            deployments,
            state: Mutex::new(MockState::default()),
        }
    }

    pub fn without_deployment(mut self, contract: ContractName) -> Self {
        self.deployments.remove(&contract);
        self
    }

    pub fn set_allowance(&self, owner: Address, spender: Address, allowance: U256) {
        self.state.lock().allowances.insert((owner, spender), allowance);
    }

    pub fn allowance(&self, owner: Address, spender: Address) -> U256 {
        self.state
            .lock()
            .allowances
            .get(&(owner, spender))
            .copied()
            .unwrap_or_default()
    }

    pub fn set_balance(&self, contract: ContractName, owner: Address, balance: U256) {
        self.state.lock().balances.insert((contract, owner), balance);
    }

    pub fn set_uint_view(&self, contract: ContractName, function: &str, value: U256) {
        self.state
            .lock()
            .uint_views
            .insert((contract, function.to_string()), value);
    }

    /// Reads and writes of this function fail from now on
    pub fn reject(&self, function: &str) {
        self.state.lock().rejected.insert(function.to_string());
    }

    /// Approvals are acknowledged but leave the allowance untouched
    pub fn ignore_approvals(&self) {
        self.state.lock().ignore_approvals = true;
    }

    /// Park every following write until `release_writes` lets it through
    pub fn hold_writes(&self) {
        self.state.lock().gate = Some(Arc::new(Semaphore::new(0)));
    }

    pub fn release_writes(&self, count: usize) {
        if let Some(gate) = &self.state.lock().gate {
            gate.add_permits(count);
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.state.lock().calls.clone()
    }

    pub fn writes(&self) -> Vec<RecordedCall> {
        self.calls()
            .into_iter()
            .filter(|call| call.kind == CallKind::Write)
            .collect()
    }

    pub fn reads(&self) -> Vec<RecordedCall> {
        self.calls()
            .into_iter()
            .filter(|call| call.kind == CallKind::Read)
            .collect()
    }

    pub fn write_functions(&self) -> Vec<String> {
        self.writes().into_iter().map(|call| call.function).collect()
    }

    fn record(&self, kind: CallKind, contract: ContractName, function: &str, args: &[Token]) {
        self.state.lock().calls.push(RecordedCall {
            kind,
            contract,
            function: function.to_string(),
            args: args.to_vec(),
        });
    }

    fn read_value(
        &self,
        contract: ContractName,
        function: &str,
        args: &[Token],
    ) -> Result<Vec<Token>, VaultError> {
        let state = self.state.lock();
        if state.rejected.contains(function) {
            return Err(err_custom_create!("{}.{} rejected by mock", contract, function));
        }
        let value = match (function, args) {
            ("allowance", [Token::Address(owner), Token::Address(spender)]) => state
                .allowances
                .get(&(*owner, *spender))
                .copied()
                .unwrap_or_default(),
            ("balanceOf", [Token::Address(owner)]) => state
                .balances
                .get(&(contract, *owner))
                .copied()
                .unwrap_or_default(),
            (function, []) => *state
                .uint_views
                .get(&(contract, function.to_string()))
                .ok_or_else(|| err_custom_create!("{}.{} not mocked", contract, function))?,
            _ => {
                return Err(err_custom_create!(
                    "Unexpected read {}.{} {:?}",
                    contract,
                    function,
                    args
                ))
            }
        };
        Ok(vec![Token::Uint(value)])
    }

    fn apply_write(
        &self,
        contract: ContractName,
        function: &str,
        args: &[Token],
    ) -> Result<WriteReceipt, VaultError> {
        let mut state = self.state.lock();
        if state.rejected.contains(function) {
            return Err(err_create!(TransactionFailedError::new(&format!(
                "{contract}.{function} rejected by mock"
            ))));
        }
        if let ("approve", [Token::Address(spender), Token::Uint(amount)], Some(owner)) =
            (function, args, self.account)
        {
            if !state.ignore_approvals {
                state.allowances.insert((owner, *spender), *amount);
            }
        }
        state.tx_counter += 1;
        let transaction_hash = H256::from_low_u64_be(state.tx_counter);
        log::debug!("Mock acknowledged {}.{} as {:#x}", contract, function, transaction_hash);
        Ok(WriteReceipt {
            transaction_hash,
            block_hash: Some(H256::from_low_u64_be(1000 + state.tx_counter)),
            block_number: Some(state.tx_counter),
        })
    }
}

impl ContractClient for MockContractClient {
    fn account(&self) -> Option<Address> {
        self.account
    }

    fn deployed_info(&self, contract: ContractName) -> Option<DeployedInfo> {
        self.deployments
            .get(&contract)
            .map(|address| DeployedInfo { address: *address })
    }

    fn read(
        &self,
        contract: ContractName,
        function: &str,
        args: Vec<Token>,
    ) -> BoxFuture<'_, Result<Vec<Token>, VaultError>> {
        self.record(CallKind::Read, contract, function, &args);
        let res = self.read_value(contract, function, &args);
        async move { res }.boxed()
    }

    fn write(
        &self,
        contract: ContractName,
        function: &str,
        args: Vec<Token>,
    ) -> BoxFuture<'_, Result<WriteReceipt, VaultError>> {
        self.record(CallKind::Write, contract, function, &args);
        let function = function.to_string();
        let gate = self.state.lock().gate.clone();
        async move {
            if let Some(gate) = gate {
                gate.acquire()
                    .await
                    .map_err(|err| err_custom_create!("Mock gate closed {err}"))?
                    .forget();
            }
            self.apply_write(contract, &function, &args)
        }
        .boxed()
    }
}
