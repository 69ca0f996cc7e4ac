use std::path::PathBuf;

use clap::Parser;
use tracing::level_filters::LevelFilter;

#[derive(Parser)]
#[command(name = "incubant")]
#[command(
    author,
    version,
    about = "Deploy the Incubant Clarity contracts to a Stacks network"
)]
pub struct Cli {
    /// The verbosity level.
    #[arg(short, long, env = "INCUBANT_VERBOSITY", default_value_t = LevelFilter::INFO)]
    pub verbosity: LevelFilter,

    /// The target network: mainnet, testnet or devnet.
    ///
    /// Unrecognized names fall back to devnet.
    #[arg(short, long, env = "STACKS_NETWORK", default_value = "devnet")]
    pub network: String,

    /// The devnet node RPC URL.
    ///
    /// Ignored on mainnet and testnet, which use the public Hiro nodes.
    #[arg(long, alias = "rpc", env = "STACKS_RPC_URL")]
    pub rpc_url: Option<String>,

    /// The deployer's private key (64 hex characters, optionally followed by `01`).
    ///
    /// A mnemonic phrase is also accepted here.
    #[arg(long, env = "DEPLOYER_SECRET_KEY", hide_env_values = true)]
    pub secret_key: Option<String>,

    /// The deployer's BIP-39 mnemonic phrase, used when no secret key is set.
    #[arg(long, env = "DEPLOYER_MNEMONIC", hide_env_values = true)]
    pub mnemonic: Option<String>,

    /// Path to a TOML file overriding the deployment configuration
    /// (contract list, contracts directory, record path, retries, delay).
    #[arg(long, alias = "conf", env = "INCUBANT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory holding the `<contract>.clar` sources.
    ///
    /// Overrides the configuration file.
    #[arg(long)]
    pub contracts_dir: Option<PathBuf>,

    /// Where to write the deployment record.
    ///
    /// Overrides the configuration file.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Also write the deployment record when a run aborts part-way.
    #[arg(long, env = "INCUBANT_RECORD_PARTIAL")]
    pub record_partial: bool,
}

impl Cli {
    /// The configured secret, preferring the private key over the mnemonic.
    pub fn secret(&self) -> Option<&str> {
        self.secret_key
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .or(self.mnemonic.as_deref())
            .filter(|s| !s.trim().is_empty())
    }
}
