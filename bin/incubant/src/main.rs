//! incubant is a CLI tool to publish the Incubant contracts to a Stacks network.

mod cli;

use anyhow::{Context, Result};
use clap::Parser;

use cli::Cli;
use incubant_deploy::{
    DeployConfig, DeployError, Deployer, DeployerKey, DeploymentRecord, Deployments, Network,
    NetworkProfile, StacksNodeClient, load_jobs, record,
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize the logger.
    tracing_subscriber::fmt()
        .with_max_level(cli.verbosity)
        .init();

    let mut config = DeployConfig::load(cli.config.as_ref())?;
    if let Some(dir) = &cli.contracts_dir {
        config.contracts_dir = dir.clone();
    }
    if let Some(output) = &cli.output {
        config.record_path = output.clone();
    }

    // Everything that can be validated locally is, before touching the network.
    let secret = cli.secret().ok_or(DeployError::MissingSecret)?;
    let key = DeployerKey::resolve(secret).context("Failed to resolve the deployer key")?;

    let network = Network::select(&cli.network);
    let profile = NetworkProfile::new(network, cli.rpc_url.as_deref())?;

    let jobs = load_jobs(&config.contracts_dir, &config.contracts)
        .context("Failed to load contract sources")?;

    let ledger = StacksNodeClient::new(profile.clone())?;
    let deployer = Deployer::new(ledger, key, profile, config);

    match deployer.deploy(&jobs).await {
        Ok(record) => {
            print_summary(&deployer, &record.contracts);
            record.save_to_file(&deployer.config().record_path)?;
            tracing::info!("✓ All contracts deployed successfully!");
            Ok(())
        }
        Err(aborted) => {
            tracing::error!(
                deployed = aborted.completed.len(),
                total = aborted.total,
                "Deployed {} of {} contracts",
                aborted.completed.len(),
                aborted.total
            );
            if !aborted.completed.is_empty() {
                print_summary(&deployer, &aborted.completed);
            }

            if cli.record_partial && !aborted.completed.is_empty() {
                DeploymentRecord::new(
                    deployer.profile().network.as_ref(),
                    deployer.address(),
                    aborted.completed.clone(),
                )
                .save_to_file(&deployer.config().record_path)?;
            }

            Err(aborted.into())
        }
    }
}

/// Print the deployed contracts, their explorer links and the env lines for the frontend.
fn print_summary<L>(deployer: &Deployer<L>, deployments: &Deployments)
where
    L: incubant_deploy::LedgerClient,
{
    println!("{}", record::summary_table(deployments, deployer.profile()));
    println!();
    println!("Update your .env file with these addresses:");
    println!();
    for line in record::env_lines(deployments) {
        println!("{line}");
    }
    println!();
}
