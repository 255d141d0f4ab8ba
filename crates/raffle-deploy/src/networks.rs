//! Per-chain raffle parameters and the set of local development networks.

use alloy_primitives::{address, b256, Address, B256, U256};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::error::DeployError;

pub const GOERLI_CHAIN_ID: u64 = 5;
pub const HARDHAT_CHAIN_ID: u64 = 31337;

/// 0.01 ETH in wei
pub const DEFAULT_ENTRANCE_FEE: U256 = U256::from_limbs([10_000_000_000_000_000, 0, 0, 0]);
/// 150 gwei key hash
pub const DEFAULT_GAS_LANE: B256 =
    b256!("0x114f3da0a805b6a67d6e9cd2ec746f7028f1b7376365af575cfea3550dd1aa04");
pub const DEFAULT_CALLBACK_GAS_LIMIT: u32 = 500_000;
pub const DEFAULT_INTERVAL_SECS: u64 = 30;

pub const GOERLI_VRF_COORDINATOR: Address = address!("0x2Ca8E0C643bDe4C2E08ab1fA0da3401AdAD7734D");

/// Where the VRF coordinator and subscription for a chain come from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChainKind {
    /// Simulated chain; coordinator and subscription are provisioned at deploy time.
    Local,
    /// Live chain with an existing coordinator and a prepaid subscription.
    Public {
        vrf_coordinator: Address,
        subscription_id: u64,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChainProfile {
    pub chain_id: u64,
    pub name: String,
    pub entrance_fee: U256,
    pub gas_lane: B256,
    pub callback_gas_limit: u32,
    pub interval: u64,
    #[serde(flatten)]
    pub kind: ChainKind,
}

impl ChainProfile {
    pub fn is_local(&self) -> bool {
        matches!(self.kind, ChainKind::Local)
    }
}

/// Immutable chain id to profile mapping, built once at startup.
#[derive(Debug, Clone)]
pub struct NetworkTable {
    profiles: BTreeMap<u64, ChainProfile>,
}

impl NetworkTable {
    pub fn new(profiles: impl IntoIterator<Item = ChainProfile>) -> Self {
        Self {
            profiles: profiles.into_iter().map(|p| (p.chain_id, p)).collect(),
        }
    }

    /// Goerli and the local Hardhat chain.
    pub fn builtin() -> Self {
        Self::new([
            ChainProfile {
                chain_id: GOERLI_CHAIN_ID,
                name: "goerli".to_string(),
                entrance_fee: DEFAULT_ENTRANCE_FEE,
                gas_lane: DEFAULT_GAS_LANE,
                callback_gas_limit: DEFAULT_CALLBACK_GAS_LIMIT,
                interval: DEFAULT_INTERVAL_SECS,
                kind: ChainKind::Public {
                    vrf_coordinator: GOERLI_VRF_COORDINATOR,
                    subscription_id: 0,
                },
            },
            ChainProfile {
                chain_id: HARDHAT_CHAIN_ID,
                name: "hardhat".to_string(),
                entrance_fee: DEFAULT_ENTRANCE_FEE,
                gas_lane: DEFAULT_GAS_LANE,
                callback_gas_limit: DEFAULT_CALLBACK_GAS_LIMIT,
                interval: DEFAULT_INTERVAL_SECS,
                kind: ChainKind::Local,
            },
        ])
    }

    pub fn lookup_profile(&self, chain_id: u64) -> Result<&ChainProfile, DeployError> {
        self.profiles
            .get(&chain_id)
            .ok_or(DeployError::UnknownChain(chain_id))
    }

    pub fn profiles(&self) -> impl Iterator<Item = &ChainProfile> {
        self.profiles.values()
    }
}

impl Default for NetworkTable {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Network names treated as local/simulated.
#[derive(Debug, Clone)]
pub struct DevelopmentChains {
    names: Vec<String>,
}

impl DevelopmentChains {
    pub fn new<S: Into<String>>(names: impl IntoIterator<Item = S>) -> Self {
        let mut ordered: Vec<String> = Vec::new();
        for name in names.into_iter().map(Into::into) {
            if !ordered.contains(&name) {
                ordered.push(name);
            }
        }
        Self { names: ordered }
    }

    pub fn is_development_network(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }
}

impl Default for DevelopmentChains {
    fn default() -> Self {
        Self::new(["hardhat", "localhost"])
    }
}
