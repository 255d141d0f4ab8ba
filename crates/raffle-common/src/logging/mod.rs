//! Logging initialization for the raffle deployment binaries
//!
//! Filter priority:
//! 1. CLI flags (`-v/-q`) - highest priority
//! 2. RUST_LOG environment variable
//! 3. Binary-specific defaults - lowest priority

use anyhow::Result;
use clap_verbosity_flag::{LogLevel, Verbosity};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize logging with the specified verbosity level and default filter.
///
/// # Example
///
/// ```no_run
/// use clap::Parser;
/// use clap_verbosity_flag::{Verbosity, InfoLevel};
/// use raffle_common::logging;
///
/// #[derive(Parser)]
/// struct Args {
///     #[clap(flatten)]
///     verbosity: Verbosity<InfoLevel>,
/// }
///
/// let args = Args::parse();
/// logging::init_logging(&args.verbosity, "raffle_deploy=info").unwrap();
/// ```
pub fn init_logging<L: LogLevel>(verbosity: &Verbosity<L>, default_filter: &str) -> Result<()> {
    let filter = build_filter(verbosity, default_filter)?;

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .compact(),
        )
        .try_init()?;

    Ok(())
}

/// Resolve the filter without installing a subscriber.
pub fn build_filter<L: LogLevel>(
    verbosity: &Verbosity<L>,
    default_filter: &str,
) -> Result<EnvFilter> {
    // Flags only count when they move the level away from the binary's default
    if verbosity.log_level() != L::default() {
        return Ok(EnvFilter::try_new(verbosity.log_level_filter().to_string())?);
    }

    Ok(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
}
