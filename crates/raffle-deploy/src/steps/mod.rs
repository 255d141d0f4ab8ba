//! Tagged deployment steps and the driver that runs them in order.

use async_trait::async_trait;
use tracing::{debug, info};

use crate::error::DeployError;
use crate::framework::DeploymentFramework;
use crate::networks::{DevelopmentChains, NetworkTable};

pub mod mocks;
pub mod raffle;

pub use mocks::{provision_mocks_if_needed, DeployMocks};
pub use raffle::DeployRaffle;

/// Everything a step may read; the framework owns all side effects.
#[derive(Clone, Copy)]
pub struct DeployContext<'a> {
    pub framework: &'a dyn DeploymentFramework,
    pub networks: &'a NetworkTable,
    pub development_chains: &'a DevelopmentChains,
}

#[async_trait]
pub trait DeployStep: Send + Sync {
    fn id(&self) -> &'static str;

    fn tags(&self) -> &'static [&'static str];

    async fn run(&self, ctx: &DeployContext<'_>) -> Result<(), DeployError>;
}

/// Steps in execution order.
pub fn default_steps() -> Vec<Box<dyn DeployStep>> {
    vec![Box::new(DeployMocks), Box::new(DeployRaffle)]
}

pub fn is_selected(step: &dyn DeployStep, tags: &[String]) -> bool {
    tags.is_empty() || step.tags().iter().any(|t| tags.iter().any(|w| w == t))
}

/// Run every selected step; the first failure aborts the run.
pub async fn run_steps(
    ctx: &DeployContext<'_>,
    steps: &[Box<dyn DeployStep>],
    tags: &[String],
) -> Result<Vec<&'static str>, DeployError> {
    let mut executed = Vec::new();
    for step in steps {
        if !is_selected(step.as_ref(), tags) {
            debug!(step = step.id(), "skipped, no matching tag");
            continue;
        }
        info!(step = step.id(), network = %ctx.framework.active_network().name, "running");
        step.run(ctx).await?;
        executed.push(step.id());
    }
    Ok(executed)
}
