//! Zentinel Azure DNS - command-line entry point
//!
//! Runs a single DNS-01 operation, suitable as an exec hook for ACME clients.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;

use zentinel_azure_dns::{AzureDnsConfig, AzureDnsProvider, Dns01Provider};

/// Azure DNS provider for ACME DNS-01 challenges
#[derive(Parser, Debug)]
#[command(name = "zentinel-azure-dns")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Configuration file path (KDL); environment variables are used if omitted
    #[arg(short = 'c', long = "config", env = "ZENTINEL_AZURE_DNS_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging (debug level)
    #[arg(long = "verbose")]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Publish the challenge TXT record
    Present(ChallengeArgs),
    /// Remove the challenge TXT record set
    Cleanup(ChallengeArgs),
    /// Print the propagation timeout and polling interval in seconds
    Timeout,
}

#[derive(Args, Debug)]
struct ChallengeArgs {
    /// Domain being validated
    #[arg(long = "domain")]
    domain: String,

    /// Challenge token
    #[arg(long = "token", default_value = "")]
    token: String,

    /// Key authorization for the challenge
    #[arg(long = "key-auth")]
    key_auth: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .init();

    let config = load_config(cli.config.as_ref())?;
    let provider =
        AzureDnsProvider::from_config(&config).context("Failed to create Azure DNS provider")?;

    match cli.command {
        Commands::Present(args) => {
            provider
                .present(&args.domain, &args.token, &args.key_auth)
                .await
                .with_context(|| format!("Failed to present challenge for {}", args.domain))?;
            info!(domain = %args.domain, "Challenge record presented");
        }
        Commands::Cleanup(args) => {
            provider
                .clean_up(&args.domain, &args.token, &args.key_auth)
                .await
                .with_context(|| format!("Failed to clean up challenge for {}", args.domain))?;
            info!(domain = %args.domain, "Challenge record cleaned up");
        }
        Commands::Timeout => {
            let (timeout, interval) = provider.timeout();
            println!("{} {}", timeout.as_secs(), interval.as_secs());
        }
    }

    Ok(())
}

fn load_config(path: Option<&PathBuf>) -> Result<AzureDnsConfig> {
    match path {
        Some(path) => {
            info!("Loading configuration file: {}", path.display());
            AzureDnsConfig::from_file(path).context("Failed to load configuration file")
        }
        None => AzureDnsConfig::from_env().context("Failed to load configuration from environment"),
    }
}
