//! Mock VRF coordinator provisioning for development networks.

use alloy_primitives::{Address, U256};
use async_trait::async_trait;
use tracing::info;

use super::{DeployContext, DeployStep};
use crate::contracts::VRF_COORDINATOR_MOCK;
use crate::error::DeployError;
use crate::framework::{DeployOptions, DeploymentFramework, DeploymentRecord};
use crate::networks::DevelopmentChains;

/// Flat fee per randomness request: 0.25 LINK
pub const BASE_FEE: U256 = U256::from_limbs([250_000_000_000_000_000, 0, 0, 0]);
/// LINK per gas, 1e9
pub const GAS_PRICE_LINK: U256 = U256::from_limbs([1_000_000_000, 0, 0, 0]);

/// Deploys `VRFCoordinatorV2Mock` when `active_network_name` is a development network.
///
/// Returns `None` without touching the framework otherwise. Repeated calls deploy again.
pub async fn provision_mocks_if_needed(
    framework: &dyn DeploymentFramework,
    development_chains: &DevelopmentChains,
    active_network_name: &str,
    deployer: Address,
) -> Result<Option<DeploymentRecord>, DeployError> {
    if !development_chains.is_development_network(active_network_name) {
        return Ok(None);
    }

    info!("Local network detected! Deploying mocks...");
    let record = framework
        .deploy_contract(
            VRF_COORDINATOR_MOCK,
            DeployOptions {
                from: deployer,
                args: vec![BASE_FEE, GAS_PRICE_LINK],
                log: true,
            },
        )
        .await?;
    info!(address = %record.address, "Mocks deployed");

    Ok(Some(record))
}

pub struct DeployMocks;

#[async_trait]
impl DeployStep for DeployMocks {
    fn id(&self) -> &'static str {
        "deploy-mocks"
    }

    fn tags(&self) -> &'static [&'static str] {
        &["all", "mocks"]
    }

    async fn run(&self, ctx: &DeployContext<'_>) -> Result<(), DeployError> {
        let deployer = ctx.framework.named_account("deployer").await?;
        let network = &ctx.framework.active_network().name;
        provision_mocks_if_needed(ctx.framework, ctx.development_chains, network, deployer).await?;
        Ok(())
    }
}
