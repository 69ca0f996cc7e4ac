//! The contracts to deploy and their Clarity sources.

use std::path::Path;

use crate::error::{DeployError, Result};

/// The Incubant contracts, in deployment order.
///
/// Later contracts may reference earlier ones, so the order matters.
pub const DEFAULT_CONTRACTS: [&str; 6] = [
    "incubation",
    "token-stream",
    "equity-token",
    "governance",
    "mentorship",
    "staking",
];

/// File extension of Clarity sources.
const CLARITY_EXTENSION: &str = "clar";

const MAX_CONTRACT_NAME_LEN: usize = 128;

/// One contract to publish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractJob {
    name: String,
    source: String,
}

impl ContractJob {
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Result<Self> {
        let name = name.into();
        validate_contract_name(&name)?;
        Ok(Self {
            name,
            source: source.into(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source(&self) -> &str {
        &self.source
    }
}

/// Check a name against the Clarity contract-name grammar.
pub fn validate_contract_name(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let valid = name.len() <= MAX_CONTRACT_NAME_LEN
        && chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');

    if valid {
        Ok(())
    } else {
        Err(DeployError::InvalidContractName(name.to_string()))
    }
}

/// Load `<dir>/<name>.clar` for every contract, in order.
///
/// Every source is read up front so that a missing file fails the run before
/// anything is broadcast.
pub fn load_jobs<S: AsRef<str>>(dir: &Path, names: &[S]) -> Result<Vec<ContractJob>> {
    names
        .iter()
        .map(|name| {
            let name = name.as_ref();
            validate_contract_name(name)?;

            let path = dir.join(format!("{name}.{CLARITY_EXTENSION}"));
            let source =
                std::fs::read_to_string(&path).map_err(|e| DeployError::ContractSource {
                    name: name.to_string(),
                    path: path.clone(),
                    reason: e.to_string(),
                })?;
            if source.trim().is_empty() {
                return Err(DeployError::ContractSource {
                    name: name.to_string(),
                    path,
                    reason: "source is empty".to_string(),
                });
            }

            tracing::debug!(
                contract = %name,
                path = %path.display(),
                bytes = source.len(),
                "Loaded contract source"
            );
            ContractJob::new(name, source)
        })
        .collect()
}
