//! assetkit command-line entry point.

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use assetkit::Services;
use assetkit::cli::{self, Cli};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Cli::parse();

    // Diagnostics go to stderr so --json output on stdout stays clean.
    let log_level = if args.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level)),
        )
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialise logging: {e}"))?;

    let services = Services::system()?;
    Ok(cli::execute(args.command, &services).await)
}
