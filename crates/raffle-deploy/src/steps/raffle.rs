//! Raffle deployment and local VRF subscription setup.

use alloy_primitives::{aliases::U96, Address, Bytes, B256, U256};
use alloy_sol_types::{SolCall, SolEvent};
use async_trait::async_trait;
use tracing::info;

use super::{DeployContext, DeployStep};
use crate::contracts::{VRFCoordinatorV2Mock, RAFFLE, VRF_COORDINATOR_MOCK};
use crate::error::DeployError;
use crate::framework::{DeployOptions, DeploymentFramework};
use crate::networks::{ChainKind, ChainProfile};

/// 2 LINK, credited to the local subscription
pub const VRF_SUBSCRIPTION_FUND_AMOUNT: U96 = U96::from_limbs([2_000_000_000_000_000_000, 0]);

/// Raffle constructor arguments, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RaffleArgs {
    pub vrf_coordinator: Address,
    pub entrance_fee: U256,
    pub gas_lane: B256,
    pub subscription_id: u64,
    pub callback_gas_limit: u32,
    pub interval: u64,
}

impl RaffleArgs {
    pub fn new(profile: &ChainProfile, vrf_coordinator: Address, subscription_id: u64) -> Self {
        Self {
            vrf_coordinator,
            entrance_fee: profile.entrance_fee,
            gas_lane: profile.gas_lane,
            subscription_id,
            callback_gas_limit: profile.callback_gas_limit,
            interval: profile.interval,
        }
    }

    pub fn to_words(&self) -> Vec<U256> {
        vec![
            U256::from_be_slice(self.vrf_coordinator.as_slice()),
            self.entrance_fee,
            U256::from_be_bytes(self.gas_lane.0),
            U256::from(self.subscription_id),
            U256::from(self.callback_gas_limit),
            U256::from(self.interval),
        ]
    }
}

async fn create_local_subscription(
    framework: &dyn DeploymentFramework,
    deployer: Address,
) -> Result<(Address, u64), DeployError> {
    let mock = framework.get_deployment(VRF_COORDINATOR_MOCK).await?;

    let receipt = framework
        .execute(
            VRF_COORDINATOR_MOCK,
            deployer,
            Bytes::from(VRFCoordinatorV2Mock::createSubscriptionCall {}.abi_encode()),
        )
        .await?;

    let subscription_id = receipt
        .logs
        .iter()
        .filter(|log| log.address == mock.address)
        .find_map(|log| {
            VRFCoordinatorV2Mock::SubscriptionCreated::decode_raw_log(
                log.topics(),
                log.data.data.as_ref(),
            )
            .ok()
        })
        .map(|event| event.subId)
        .ok_or(DeployError::MissingEvent {
            event: "SubscriptionCreated",
            contract: mock.address,
        })?;

    framework
        .execute(
            VRF_COORDINATOR_MOCK,
            deployer,
            Bytes::from(
                VRFCoordinatorV2Mock::fundSubscriptionCall {
                    subId: subscription_id,
                    amount: VRF_SUBSCRIPTION_FUND_AMOUNT,
                }
                .abi_encode(),
            ),
        )
        .await?;
    info!(
        subscription_id,
        coordinator = %mock.address,
        "created and funded local VRF subscription"
    );

    Ok((mock.address, subscription_id))
}

/// Deploys `Raffle` with the active chain's profile.
///
/// On local chains the coordinator is the recorded mock, a fresh subscription is
/// created and funded on it, and the raffle is registered as its consumer.
pub struct DeployRaffle;

#[async_trait]
impl DeployStep for DeployRaffle {
    fn id(&self) -> &'static str {
        "deploy-raffle"
    }

    fn tags(&self) -> &'static [&'static str] {
        &["all", "raffle"]
    }

    async fn run(&self, ctx: &DeployContext<'_>) -> Result<(), DeployError> {
        let framework = ctx.framework;
        let deployer = framework.named_account("deployer").await?;
        let profile = ctx
            .networks
            .lookup_profile(framework.active_network().chain_id)?;

        let args = match &profile.kind {
            ChainKind::Public {
                vrf_coordinator,
                subscription_id,
            } => RaffleArgs::new(profile, *vrf_coordinator, *subscription_id),
            ChainKind::Local => {
                let (coordinator, subscription_id) =
                    create_local_subscription(framework, deployer).await?;
                RaffleArgs::new(profile, coordinator, subscription_id)
            }
        };

        let raffle = framework
            .deploy_contract(
                RAFFLE,
                DeployOptions {
                    from: deployer,
                    args: args.to_words(),
                    log: true,
                },
            )
            .await?;

        if profile.is_local() {
            framework
                .execute(
                    VRF_COORDINATOR_MOCK,
                    deployer,
                    Bytes::from(
                        VRFCoordinatorV2Mock::addConsumerCall {
                            subId: args.subscription_id,
                            consumer: raffle.address,
                        }
                        .abi_encode(),
                    ),
                )
                .await?;
            info!(consumer = %raffle.address, "registered raffle as VRF consumer");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framework::MockFramework;
    use crate::networks::{DevelopmentChains, NetworkTable, GOERLI_VRF_COORDINATOR};
    use crate::steps::DeployMocks;
    use alloy_primitives::{address, Log};
    use pretty_assertions::assert_eq;

    const DEPLOYER: Address = address!("0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa");

    fn subscription_created(coordinator: Address, sub_id: u64) -> Log {
        let event = VRFCoordinatorV2Mock::SubscriptionCreated {
            subId: sub_id,
            owner: DEPLOYER,
        };
        Log {
            address: coordinator,
            data: event.encode_log_data(),
        }
    }

    #[tokio::test]
    async fn test_goerli_uses_profile_coordinator() {
        let framework = MockFramework::new("goerli", 5).with_account("deployer", DEPLOYER);
        let networks = NetworkTable::builtin();
        let development_chains = DevelopmentChains::default();
        let ctx = DeployContext {
            framework: &framework,
            networks: &networks,
            development_chains: &development_chains,
        };

        DeployRaffle.run(&ctx).await.unwrap();

        let calls = framework.deploy_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "Raffle");
        assert_eq!(
            calls[0].1.args,
            vec![
                U256::from_be_slice(GOERLI_VRF_COORDINATOR.as_slice()),
                U256::from(10_000_000_000_000_000u64),
                U256::from_be_bytes(crate::networks::DEFAULT_GAS_LANE.0),
                U256::ZERO,
                U256::from(500_000u64),
                U256::from(30u64),
            ]
        );
        assert!(framework.executions().is_empty());
    }

    #[tokio::test]
    async fn test_local_chain_without_mock_fails() {
        let framework = MockFramework::new("hardhat", 31337).with_account("deployer", DEPLOYER);
        let networks = NetworkTable::builtin();
        let development_chains = DevelopmentChains::default();
        let ctx = DeployContext {
            framework: &framework,
            networks: &networks,
            development_chains: &development_chains,
        };

        let result = DeployRaffle.run(&ctx).await;
        assert!(matches!(
            result,
            Err(DeployError::NoDeployment { contract, .. }) if contract == VRF_COORDINATOR_MOCK
        ));
        assert!(framework.deploy_calls().is_empty());
    }

    #[tokio::test]
    async fn test_local_chain_creates_funds_and_registers_subscription() {
        let framework = MockFramework::new("hardhat", 31337).with_account("deployer", DEPLOYER);
        let networks = NetworkTable::builtin();
        let development_chains = DevelopmentChains::default();
        let ctx = DeployContext {
            framework: &framework,
            networks: &networks,
            development_chains: &development_chains,
        };

        DeployMocks.run(&ctx).await.unwrap();
        let mock = framework.get_deployment(VRF_COORDINATOR_MOCK).await.unwrap();
        framework.queue_execution_logs(
            VRF_COORDINATOR_MOCK,
            vec![subscription_created(mock.address, 7)],
        );

        DeployRaffle.run(&ctx).await.unwrap();

        let calls = framework.deploy_calls();
        assert_eq!(calls.len(), 2);
        let raffle_args = &calls[1].1.args;
        assert_eq!(raffle_args[0], U256::from_be_slice(mock.address.as_slice()));
        assert_eq!(raffle_args[3], U256::from(7u64));

        let raffle = framework.get_deployment(RAFFLE).await.unwrap();
        let executions = framework.executions();
        assert_eq!(executions.len(), 3);
        assert!(executions
            .iter()
            .all(|e| e.contract_name == VRF_COORDINATOR_MOCK && e.from == DEPLOYER));

        assert_eq!(
            executions[0].calldata.as_ref(),
            VRFCoordinatorV2Mock::createSubscriptionCall {}.abi_encode().as_slice()
        );
        let fund = VRFCoordinatorV2Mock::fundSubscriptionCall::abi_decode(&executions[1].calldata)
            .unwrap();
        assert_eq!(fund.subId, 7);
        assert_eq!(fund.amount, VRF_SUBSCRIPTION_FUND_AMOUNT);
        let consumer =
            VRFCoordinatorV2Mock::addConsumerCall::abi_decode(&executions[2].calldata).unwrap();
        assert_eq!(consumer.subId, 7);
        assert_eq!(consumer.consumer, raffle.address);
    }

    #[tokio::test]
    async fn test_missing_subscription_event() {
        let framework = MockFramework::new("hardhat", 31337).with_account("deployer", DEPLOYER);
        let networks = NetworkTable::builtin();
        let development_chains = DevelopmentChains::default();
        let ctx = DeployContext {
            framework: &framework,
            networks: &networks,
            development_chains: &development_chains,
        };

        DeployMocks.run(&ctx).await.unwrap();
        // event from an unrelated contract is ignored
        framework.queue_execution_logs(
            VRF_COORDINATOR_MOCK,
            vec![subscription_created(Address::with_last_byte(0xee), 1)],
        );

        let result = DeployRaffle.run(&ctx).await;
        assert!(matches!(
            result,
            Err(DeployError::MissingEvent { event: "SubscriptionCreated", .. })
        ));
        assert_eq!(framework.deploy_calls().len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_chain_id() {
        let framework =
            MockFramework::new("sepolia", 11155111).with_account("deployer", DEPLOYER);
        let networks = NetworkTable::builtin();
        let development_chains = DevelopmentChains::default();
        let ctx = DeployContext {
            framework: &framework,
            networks: &networks,
            development_chains: &development_chains,
        };

        let result = DeployRaffle.run(&ctx).await;
        assert!(matches!(result, Err(DeployError::UnknownChain(11155111))));
    }
}
