//! JSON-RPC backed implementation of the deployment framework.

use alloy::rpc::types::{TransactionReceipt, TransactionRequest};
use alloy::signers::Signer;
use alloy_network::TransactionBuilder;
use alloy_primitives::{Address, Bytes};
use alloy_provider::{DynProvider, Provider, ProviderBuilder};
use async_trait::async_trait;
use std::collections::BTreeMap;
use tracing::{debug, info};

use crate::config::{resolve_signer, DeployConfig, NetworkSettings};
use crate::error::DeployError;
use crate::framework::{
    encode_constructor_args, ActiveNetwork, DeployOptions, DeploymentFramework, DeploymentRecord,
    ExecutionReceipt,
};
use crate::networks::DevelopmentChains;
use crate::store::{ArtifactStore, DeploymentStore};

/// Deployment framework backed by a JSON-RPC node.
pub struct AlloyFramework {
    network: ActiveNetwork,
    settings: NetworkSettings,
    signer_address: Address,
    named_accounts: BTreeMap<String, usize>,
    provider: DynProvider,
    artifacts: ArtifactStore,
    deployments: DeploymentStore,
}

impl AlloyFramework {
    pub async fn connect(
        config: &DeployConfig,
        network_name: &str,
        private_key: Option<&str>,
        development_chains: &DevelopmentChains,
    ) -> Result<Self, DeployError> {
        let settings = config.network(network_name)?.clone();
        let mut signer = resolve_signer(private_key, network_name, development_chains)?;
        signer.set_chain_id(Some(settings.chain_id));
        let signer_address = signer.address();

        let provider = ProviderBuilder::new()
            .wallet(signer)
            .connect(&settings.rpc_url)
            .await?
            .erased();

        let remote_chain_id = provider.get_chain_id().await?;
        if remote_chain_id != settings.chain_id {
            return Err(DeployError::ChainIdMismatch {
                rpc_url: settings.rpc_url.clone(),
                expected: settings.chain_id,
                actual: remote_chain_id,
            });
        }

        info!(
            network = network_name,
            chain_id = settings.chain_id,
            rpc_url = %settings.rpc_url,
            signer = %signer_address,
            "connected"
        );

        Ok(Self {
            network: ActiveNetwork {
                name: network_name.to_string(),
                chain_id: settings.chain_id,
            },
            settings,
            signer_address,
            named_accounts: config.named_accounts.clone(),
            provider,
            artifacts: ArtifactStore::new(&config.artifacts_dir),
            deployments: DeploymentStore::new(&config.deployments_dir),
        })
    }

    async fn submit(&self, tx: TransactionRequest) -> Result<TransactionReceipt, DeployError> {
        let tx = match self.settings.gas_limit {
            Some(gas) => tx.with_gas_limit(gas),
            None => tx,
        };

        let pending = self.provider.send_transaction(tx).await?;
        debug!(tx = %pending.tx_hash(), "transaction submitted");

        let receipt = pending
            .with_required_confirmations(self.settings.block_confirmations)
            .get_receipt()
            .await?;

        if !receipt.status() {
            return Err(DeployError::Reverted(receipt.transaction_hash));
        }
        Ok(receipt)
    }
}

#[async_trait]
impl DeploymentFramework for AlloyFramework {
    fn active_network(&self) -> &ActiveNetwork {
        &self.network
    }

    async fn named_account(&self, role: &str) -> Result<Address, DeployError> {
        let index = *self
            .named_accounts
            .get(role)
            .ok_or_else(|| DeployError::UnknownNamedAccount(role.to_string()))?;

        if index == 0 {
            return Ok(self.signer_address);
        }

        let accounts = self.provider.get_accounts().await?;
        accounts
            .get(index)
            .copied()
            .ok_or_else(|| DeployError::UnknownNamedAccount(role.to_string()))
    }

    async fn deploy_contract(
        &self,
        contract_name: &str,
        options: DeployOptions,
    ) -> Result<DeploymentRecord, DeployError> {
        let artifact = self.artifacts.load(contract_name)?;

        let mut code = artifact.bytecode().to_vec();
        code.extend(encode_constructor_args(&options.args));

        let tx = TransactionRequest::default()
            .with_from(options.from)
            .with_deploy_code(Bytes::from(code));

        if options.log {
            info!(
                network = %self.network.name,
                "deploying \"{contract_name}\" from {}",
                options.from
            );
        }

        let receipt = self.submit(tx).await?;
        let address = receipt
            .contract_address
            .ok_or(DeployError::MissingContractAddress(receipt.transaction_hash))?;

        let record = DeploymentRecord {
            contract_name: contract_name.to_string(),
            address,
            transaction_hash: receipt.transaction_hash,
            args: options.args,
            abi: artifact.abi,
            block_number: receipt.block_number,
            gas_used: Some(receipt.gas_used),
        };
        let path = self
            .deployments
            .save(&self.network.name, self.network.chain_id, &record)?;

        if options.log {
            info!(
                tx = %receipt.transaction_hash,
                record = %path.display(),
                "deployed \"{contract_name}\" at {address} with {} gas",
                receipt.gas_used
            );
        }
        Ok(record)
    }

    async fn get_deployment(&self, contract_name: &str) -> Result<DeploymentRecord, DeployError> {
        self.deployments.load(&self.network.name, contract_name)
    }

    async fn execute(
        &self,
        contract_name: &str,
        from: Address,
        calldata: Bytes,
    ) -> Result<ExecutionReceipt, DeployError> {
        let target = self.get_deployment(contract_name).await?;

        let tx = TransactionRequest::default()
            .with_from(from)
            .with_to(target.address)
            .with_input(calldata);

        let receipt = self.submit(tx).await?;
        debug!(
            contract = contract_name,
            tx = %receipt.transaction_hash,
            "executed"
        );

        Ok(ExecutionReceipt {
            transaction_hash: receipt.transaction_hash,
            logs: receipt
                .inner
                .logs()
                .iter()
                .map(|log| log.inner.clone())
                .collect(),
        })
    }
}
