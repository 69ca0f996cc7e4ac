//! Deployment configuration.
//!
//! The defaults describe the Incubant deployment; an optional TOML file and
//! `INCUBANT_*` environment variables can override them. The resulting
//! [`DeployConfig`] is immutable for the rest of the run.

use std::{path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use crate::contracts::{DEFAULT_CONTRACTS, validate_contract_name};

/// Prefix of the environment variables overriding [`DeployConfig`] fields.
pub const ENV_PREFIX: &str = "INCUBANT_";

/// Retries allowed per contract after a nonce conflict (3 attempts in total).
pub const DEFAULT_MAX_RETRIES: u32 = 2;
/// Pause between two consecutive deployments.
pub const DEFAULT_INTER_JOB_DELAY_SECS: u64 = 3;
/// Where the deployment record is written.
pub const DEFAULT_RECORD_PATH: &str = "deployment.json";
/// Where the Clarity sources are read from.
pub const DEFAULT_CONTRACTS_DIR: &str = "contracts";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployConfig {
    /// Contract names, in deployment order.
    pub contracts: Vec<String>,
    /// Directory holding `<name>.clar` sources.
    pub contracts_dir: PathBuf,
    /// Output path of the deployment record.
    pub record_path: PathBuf,
    /// Retries per contract after a nonce conflict.
    pub max_retries: u32,
    /// Delay between deployments, in seconds.
    pub inter_job_delay_secs: u64,
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            contracts: DEFAULT_CONTRACTS.iter().map(|s| s.to_string()).collect(),
            contracts_dir: PathBuf::from(DEFAULT_CONTRACTS_DIR),
            record_path: PathBuf::from(DEFAULT_RECORD_PATH),
            max_retries: DEFAULT_MAX_RETRIES,
            inter_job_delay_secs: DEFAULT_INTER_JOB_DELAY_SECS,
        }
    }
}

impl DeployConfig {
    /// Layer defaults, an optional TOML file and the environment.
    pub fn load(path: Option<&PathBuf>) -> Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(path) = path {
            if !path.exists() {
                anyhow::bail!("Configuration file not found: {}", path.display());
            }
            figment = figment.merge(Toml::file(path));
        }

        let config: Self = figment
            .merge(Env::prefixed(ENV_PREFIX).only(&[
                "contracts",
                "contracts_dir",
                "record_path",
                "max_retries",
                "inter_job_delay_secs",
            ]))
            .extract()
            .context("Failed to load deployment configuration")?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.contracts.is_empty() {
            anyhow::bail!("At least one contract must be configured");
        }
        for name in &self.contracts {
            validate_contract_name(name)?;
        }
        let mut seen = std::collections::HashSet::new();
        if let Some(dup) = self.contracts.iter().find(|name| !seen.insert(name.as_str())) {
            anyhow::bail!("Contract '{}' is listed more than once", dup);
        }
        Ok(())
    }

    /// Total attempts per contract, including the first.
    pub fn max_attempts(&self) -> u32 {
        self.max_retries + 1
    }

    pub fn inter_job_delay(&self) -> Duration {
        Duration::from_secs(self.inter_job_delay_secs)
    }
}
