use anyhow::Result;
use clap::{Parser, Subcommand};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use raffle_deploy::networks::ChainKind;
use raffle_deploy::{
    default_steps, run_steps, AlloyFramework, DeployConfig, DeployContext, DevelopmentChains,
    NetworkTable,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "raffle-deploy")]
#[command(about = "Deploy the VRF raffle and its local mocks")]
#[command(version)]
struct Cli {
    /// Network to deploy to (defaults to `default_network` from the config)
    #[arg(long, global = true)]
    network: Option<String>,

    /// Path to a TOML config file (defaults to ./raffle-deploy.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(flatten)]
    verbosity: Verbosity<InfoLevel>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run deployment steps
    Deploy {
        /// Only run steps carrying one of these tags (comma separated)
        #[arg(long, value_delimiter = ',')]
        tags: Vec<String>,
        /// Private key for signing transactions (hex string)
        #[arg(long, env = "PRIVATE_KEY", hide_env_values = true)]
        private_key: Option<String>,
    },
    /// List configured networks
    Networks,
    /// Show the raffle parameters for a chain
    Profile {
        /// Chain id (defaults to the selected network's chain id)
        #[arg(long)]
        chain_id: Option<u64>,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    raffle_common::logging::init_logging(&cli.verbosity, "raffle_deploy=info")?;

    let config = DeployConfig::load(cli.config.as_deref())?;
    let network = cli
        .network
        .clone()
        .unwrap_or_else(|| config.default_network.clone());

    let networks = NetworkTable::builtin();
    let development_chains = DevelopmentChains::default();

    match cli.command {
        Commands::Deploy { tags, private_key } => {
            handle_deploy(
                &config,
                &network,
                &tags,
                private_key.as_deref(),
                &networks,
                &development_chains,
            )
            .await
        }
        Commands::Networks => {
            handle_networks(&config, &network, &development_chains);
            Ok(())
        }
        Commands::Profile { chain_id, json } => {
            let chain_id = match chain_id {
                Some(id) => id,
                None => config.network(&network)?.chain_id,
            };
            handle_profile(&networks, chain_id, json)
        }
    }
}

async fn handle_deploy(
    config: &DeployConfig,
    network: &str,
    tags: &[String],
    private_key: Option<&str>,
    networks: &NetworkTable,
    development_chains: &DevelopmentChains,
) -> Result<()> {
    let framework =
        AlloyFramework::connect(config, network, private_key, development_chains).await?;
    let ctx = DeployContext {
        framework: &framework,
        networks,
        development_chains,
    };

    let executed = run_steps(&ctx, &default_steps(), tags).await?;
    if executed.is_empty() {
        println!("No deployment steps matched tags {:?}", tags);
    } else {
        println!("Completed {} on {}", executed.join(", "), network);
    }
    Ok(())
}

fn handle_networks(config: &DeployConfig, selected: &str, development_chains: &DevelopmentChains) {
    for (name, settings) in &config.networks {
        let marker = if name == selected { "*" } else { " " };
        let kind = if development_chains.is_development_network(name) {
            "development"
        } else {
            "live"
        };
        println!(
            "{} {:<12} chain {:<8} {:<12} {}",
            marker, name, settings.chain_id, kind, settings.rpc_url
        );
    }
}

fn handle_profile(networks: &NetworkTable, chain_id: u64, json: bool) -> Result<()> {
    let profile = networks.lookup_profile(chain_id)?;

    if json {
        println!("{}", serde_json::to_string_pretty(profile)?);
        return Ok(());
    }

    println!("Chain {} ({})", profile.chain_id, profile.name);
    println!("  Entrance fee: {} wei", profile.entrance_fee);
    println!("  Gas lane: {}", profile.gas_lane);
    println!("  Callback gas limit: {}", profile.callback_gas_limit);
    println!("  Interval: {} seconds", profile.interval);
    match &profile.kind {
        ChainKind::Local => {
            println!("  VRF coordinator: provisioned by the mocks step");
        }
        ChainKind::Public {
            vrf_coordinator,
            subscription_id,
        } => {
            println!("  VRF coordinator: {}", vrf_coordinator);
            println!("  Subscription ID: {}", subscription_id);
        }
    }
    Ok(())
}
