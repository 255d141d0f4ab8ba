//! Tool configuration and signing-key resolution.

use alloy::signers::local::PrivateKeySigner;
use alloy_primitives::B256;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use hex::FromHex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::DeployError;
use crate::networks::{DevelopmentChains, GOERLI_CHAIN_ID, HARDHAT_CHAIN_ID};

pub const DEFAULT_CONFIG_FILE: &str = "raffle-deploy.toml";
pub const ENV_PREFIX: &str = "RAFFLE_DEPLOY_";

pub const LOCAL_RPC_URL: &str = "http://127.0.0.1:8545";
pub const GOERLI_RPC_URL: &str = "https://rpc.ankr.com/eth_goerli";

// Account #0 of every Hardhat/Anvil node. Only ever accepted on development networks.
pub const DEV_PRIVATE_KEY: &str =
    "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkSettings {
    pub chain_id: u64,
    pub rpc_url: String,
    pub block_confirmations: u64,
    #[serde(default)]
    pub gas_limit: Option<u64>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DeployConfig {
    pub default_network: String,
    pub networks: BTreeMap<String, NetworkSettings>,
    /// Role name to account index on the connected node
    pub named_accounts: BTreeMap<String, usize>,
    pub artifacts_dir: PathBuf,
    pub deployments_dir: PathBuf,
}

impl Default for DeployConfig {
    fn default() -> Self {
        let local = NetworkSettings {
            chain_id: HARDHAT_CHAIN_ID,
            rpc_url: LOCAL_RPC_URL.to_string(),
            block_confirmations: 1,
            gas_limit: None,
        };

        let mut networks = BTreeMap::new();
        networks.insert("hardhat".to_string(), local.clone());
        networks.insert("localhost".to_string(), local);
        networks.insert(
            "goerli".to_string(),
            NetworkSettings {
                chain_id: GOERLI_CHAIN_ID,
                rpc_url: GOERLI_RPC_URL.to_string(),
                block_confirmations: 6,
                gas_limit: Some(6_000_000),
            },
        );

        let mut named_accounts = BTreeMap::new();
        named_accounts.insert("deployer".to_string(), 0);
        named_accounts.insert("player".to_string(), 1);

        Self {
            default_network: "hardhat".to_string(),
            networks,
            named_accounts,
            artifacts_dir: PathBuf::from("artifacts"),
            deployments_dir: PathBuf::from("deployments"),
        }
    }
}

impl DeployConfig {
    /// Defaults, then the TOML file (explicit path or `raffle-deploy.toml`), then
    /// `RAFFLE_DEPLOY_*` environment variables with `__` as the nesting separator.
    pub fn load(path_override: Option<&Path>) -> Result<Self, DeployError> {
        let mut figment = Figment::from(Serialized::defaults(DeployConfig::default()));

        match path_override {
            Some(path) => {
                if !path.exists() {
                    return Err(DeployError::Config(format!(
                        "config file {} does not exist",
                        path.display()
                    )));
                }
                figment = figment.merge(Toml::file(path));
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    figment = figment.merge(Toml::file(default_path));
                }
            }
        }

        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));

        figment
            .extract()
            .map_err(|e| DeployError::Config(e.to_string()))
    }

    pub fn network(&self, name: &str) -> Result<&NetworkSettings, DeployError> {
        self.networks
            .get(name)
            .ok_or_else(|| DeployError::UnknownNetwork(name.to_string()))
    }
}

/// Pick the signing key for `network_name`.
///
/// Development networks always sign with the well-known local account, so a live
/// key sitting in `.env` never reaches a local node. Live networks require a
/// well-formed key.
pub fn resolve_signer(
    private_key: Option<&str>,
    network_name: &str,
    development_chains: &DevelopmentChains,
) -> Result<PrivateKeySigner, DeployError> {
    let private_key = private_key.map(str::trim).filter(|k| !k.is_empty());

    if development_chains.is_development_network(network_name) {
        if private_key.is_some() {
            debug!(
                network = network_name,
                "ignoring PRIVATE_KEY on development network"
            );
        }
        debug!(network = network_name, "using local dev account");
        return parse_private_key(DEV_PRIVATE_KEY);
    }

    match private_key {
        Some(key) => parse_private_key(key),
        None => Err(DeployError::MissingPrivateKey(network_name.to_string())),
    }
}

fn parse_private_key(key: &str) -> Result<PrivateKeySigner, DeployError> {
    let key = key.strip_prefix("0x").unwrap_or(key);
    if key.len() != 64 {
        return Err(DeployError::InvalidPrivateKey(
            "private key must be 32 bytes (64 hex characters)".to_string(),
        ));
    }
    let bytes = <[u8; 32]>::from_hex(key)
        .map_err(|e| DeployError::InvalidPrivateKey(e.to_string()))?;
    PrivateKeySigner::from_bytes(&B256::from(bytes))
        .map_err(|e| DeployError::InvalidPrivateKey(e.to_string()))
}
