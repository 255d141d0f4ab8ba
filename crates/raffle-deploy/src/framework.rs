//! Seam between deployment steps and whatever signs, submits and records transactions.

use alloy_primitives::{Address, Bytes, Log, TxHash, B256, U256};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, VecDeque};

use crate::error::DeployError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveNetwork {
    pub name: String,
    pub chain_id: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployOptions {
    pub from: Address,
    /// Constructor arguments, one static ABI word each
    pub args: Vec<U256>,
    pub log: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentRecord {
    pub contract_name: String,
    pub address: Address,
    pub transaction_hash: TxHash,
    pub args: Vec<U256>,
    #[serde(default)]
    pub abi: serde_json::Value,
    #[serde(default)]
    pub block_number: Option<u64>,
    #[serde(default)]
    pub gas_used: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionReceipt {
    pub transaction_hash: TxHash,
    pub logs: Vec<Log>,
}

#[async_trait]
pub trait DeploymentFramework: Send + Sync {
    fn active_network(&self) -> &ActiveNetwork;

    async fn named_account(&self, role: &str) -> Result<Address, DeployError>;

    async fn deploy_contract(
        &self,
        contract_name: &str,
        options: DeployOptions,
    ) -> Result<DeploymentRecord, DeployError>;

    /// Latest recorded deployment of `contract_name` on the active network.
    async fn get_deployment(&self, contract_name: &str) -> Result<DeploymentRecord, DeployError>;

    /// Send `calldata` to the recorded deployment of `contract_name`.
    async fn execute(
        &self,
        contract_name: &str,
        from: Address,
        calldata: Bytes,
    ) -> Result<ExecutionReceipt, DeployError>;
}

/// Constructor words appended to creation bytecode.
pub fn encode_constructor_args(args: &[U256]) -> Vec<u8> {
    args.iter().flat_map(|arg| arg.to_be_bytes::<32>()).collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionCall {
    pub contract_name: String,
    pub from: Address,
    pub calldata: Bytes,
}

/// In-memory framework for testing
///
/// Deployments get sequential addresses and are never deduplicated.
pub struct MockFramework {
    network: ActiveNetwork,
    accounts: BTreeMap<String, Address>,
    deployments: Mutex<HashMap<String, DeploymentRecord>>,
    deploy_calls: Mutex<Vec<(String, DeployOptions)>>,
    executions: Mutex<Vec<ExecutionCall>>,
    queued_logs: Mutex<HashMap<String, VecDeque<Vec<Log>>>>,
    nonce: Mutex<u64>,
}

impl MockFramework {
    pub fn new(name: impl Into<String>, chain_id: u64) -> Self {
        Self {
            network: ActiveNetwork {
                name: name.into(),
                chain_id,
            },
            accounts: BTreeMap::new(),
            deployments: Mutex::new(HashMap::new()),
            deploy_calls: Mutex::new(Vec::new()),
            executions: Mutex::new(Vec::new()),
            queued_logs: Mutex::new(HashMap::new()),
            nonce: Mutex::new(0),
        }
    }

    pub fn with_account(mut self, role: impl Into<String>, address: Address) -> Self {
        self.accounts.insert(role.into(), address);
        self
    }

    /// Logs returned by the next `execute` against `contract_name`.
    pub fn queue_execution_logs(&self, contract_name: impl Into<String>, logs: Vec<Log>) {
        self.queued_logs
            .lock()
            .entry(contract_name.into())
            .or_default()
            .push_back(logs);
    }

    pub fn deploy_calls(&self) -> Vec<(String, DeployOptions)> {
        self.deploy_calls.lock().clone()
    }

    pub fn executions(&self) -> Vec<ExecutionCall> {
        self.executions.lock().clone()
    }

    fn next_nonce(&self) -> u64 {
        let mut nonce = self.nonce.lock();
        *nonce += 1;
        *nonce
    }
}

#[async_trait]
impl DeploymentFramework for MockFramework {
    fn active_network(&self) -> &ActiveNetwork {
        &self.network
    }

    async fn named_account(&self, role: &str) -> Result<Address, DeployError> {
        self.accounts
            .get(role)
            .copied()
            .ok_or_else(|| DeployError::UnknownNamedAccount(role.to_string()))
    }

    async fn deploy_contract(
        &self,
        contract_name: &str,
        options: DeployOptions,
    ) -> Result<DeploymentRecord, DeployError> {
        let nonce = self.next_nonce();
        let record = DeploymentRecord {
            contract_name: contract_name.to_string(),
            address: Address::left_padding_from(&nonce.to_be_bytes()),
            transaction_hash: B256::left_padding_from(&nonce.to_be_bytes()),
            args: options.args.clone(),
            abi: serde_json::Value::Array(Vec::new()),
            block_number: Some(nonce),
            gas_used: Some(21_000),
        };

        self.deploy_calls
            .lock()
            .push((contract_name.to_string(), options));
        self.deployments
            .lock()
            .insert(contract_name.to_string(), record.clone());
        Ok(record)
    }

    async fn get_deployment(&self, contract_name: &str) -> Result<DeploymentRecord, DeployError> {
        self.deployments
            .lock()
            .get(contract_name)
            .cloned()
            .ok_or_else(|| DeployError::NoDeployment {
                contract: contract_name.to_string(),
                network: self.network.name.clone(),
            })
    }

    async fn execute(
        &self,
        contract_name: &str,
        from: Address,
        calldata: Bytes,
    ) -> Result<ExecutionReceipt, DeployError> {
        self.get_deployment(contract_name).await?;

        let nonce = self.next_nonce();
        self.executions.lock().push(ExecutionCall {
            contract_name: contract_name.to_string(),
            from,
            calldata,
        });
        let logs = self
            .queued_logs
            .lock()
            .get_mut(contract_name)
            .and_then(VecDeque::pop_front)
            .unwrap_or_default();

        Ok(ExecutionReceipt {
            transaction_hash: B256::left_padding_from(&nonce.to_be_bytes()),
            logs,
        })
    }
}
