//! Deploys the VRF raffle and, on development networks, its mock coordinator.

pub mod alloy_framework;
pub mod config;
pub mod contracts;
pub mod error;
pub mod framework;
pub mod networks;
pub mod steps;
pub mod store;

pub use alloy_framework::AlloyFramework;
pub use config::DeployConfig;
pub use error::DeployError;
pub use framework::{DeployOptions, DeploymentFramework, DeploymentRecord, MockFramework};
pub use networks::{ChainKind, ChainProfile, DevelopmentChains, NetworkTable};
pub use steps::{default_steps, provision_mocks_if_needed, run_steps, DeployContext, DeployStep};
