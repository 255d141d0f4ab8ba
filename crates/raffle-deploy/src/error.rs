//! Error type shared by the library.

use alloy_primitives::{Address, TxHash};
use thiserror::Error;

/// Errors surfaced by deployment steps and the deployment framework.
#[derive(Debug, Error)]
pub enum DeployError {
    #[error("no chain profile for chain id {0}")]
    UnknownChain(u64),

    #[error("network '{0}' is not configured")]
    UnknownNetwork(String),

    #[error("PRIVATE_KEY must be set to deploy on non-development network '{0}'")]
    MissingPrivateKey(String),

    #[error("invalid private key: {0}")]
    InvalidPrivateKey(String),

    #[error("named account '{0}' is not available")]
    UnknownNamedAccount(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("artifact for '{name}' unavailable: {reason}")]
    Artifact { name: String, reason: String },

    #[error("no deployment of '{contract}' recorded on network '{network}'")]
    NoDeployment { contract: String, network: String },

    #[error("node at {rpc_url} reports chain id {actual}, expected {expected}")]
    ChainIdMismatch {
        rpc_url: String,
        expected: u64,
        actual: u64,
    },

    #[error("transaction {0} reverted")]
    Reverted(TxHash),

    #[error("creation transaction {0} produced no contract address")]
    MissingContractAddress(TxHash),

    #[error("expected event '{event}' from {contract} was not emitted")]
    MissingEvent { event: &'static str, contract: Address },

    #[error(transparent)]
    Transport(#[from] alloy::transports::TransportError),

    #[error(transparent)]
    PendingTransaction(#[from] alloy_provider::PendingTransactionError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
