//! The record of a deployment run: what was published, where, and how to find it.

use std::{fmt, path::Path};

use chrono::{DateTime, SubsecRound, Utc};
use comfy_table::{Table, presets::UTF8_FULL};
use serde::{
    Deserialize, Deserializer, Serialize, Serializer,
    de::{MapAccess, Visitor},
    ser::SerializeMap,
};

use crate::{
    error::{DeployError, Result},
    network::NetworkProfile,
};

/// One published contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentResult {
    pub name: String,
    pub tx_id: String,
    /// Fully qualified contract id, `<deployer>.<name>`.
    pub address: String,
}

/// Serialized value of a [`DeploymentResult`], keyed by contract name.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeploymentEntry {
    tx_id: String,
    address: String,
}

/// Deployed contracts in the order they were published.
///
/// Serializes as a JSON object keyed by contract name, preserving order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Deployments(Vec<DeploymentResult>);

impl Deployments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a result. Entries are never overwritten.
    pub fn push(&mut self, result: DeploymentResult) {
        debug_assert!(self.get(&result.name).is_none(), "duplicate contract");
        self.0.push(result);
    }

    pub fn get(&self, name: &str) -> Option<&DeploymentResult> {
        self.0.iter().find(|r| r.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &DeploymentResult> {
        self.0.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.0.iter().map(|r| r.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for Deployments {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for result in &self.0 {
            map.serialize_entry(
                &result.name,
                &DeploymentEntry {
                    tx_id: result.tx_id.clone(),
                    address: result.address.clone(),
                },
            )?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Deployments {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct DeploymentsVisitor;

        impl<'de> Visitor<'de> for DeploymentsVisitor {
            type Value = Deployments;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of contract name to deployment")
            }

            fn visit_map<A: MapAccess<'de>>(
                self,
                mut access: A,
            ) -> std::result::Result<Self::Value, A::Error> {
                let mut results = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((name, entry)) = access.next_entry::<String, DeploymentEntry>()? {
                    results.push(DeploymentResult {
                        name,
                        tx_id: entry.tx_id,
                        address: entry.address,
                    });
                }
                Ok(Deployments(results))
            }
        }

        deserializer.deserialize_map(DeploymentsVisitor)
    }
}

/// The persisted summary of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentRecord {
    pub network: String,
    pub deployer_address: String,
    pub deployed_at: DateTime<Utc>,
    pub contracts: Deployments,
}

impl DeploymentRecord {
    /// Create a record stamped with the current time (millisecond precision).
    pub fn new(network: &str, deployer_address: &str, contracts: Deployments) -> Self {
        Self {
            network: network.to_string(),
            deployer_address: deployer_address.to_string(),
            deployed_at: Utc::now().trunc_subsecs(3),
            contracts,
        }
    }

    /// Write the record as pretty JSON, replacing any previous file.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| DeployError::Record(format!("failed to serialize record: {e}")))?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                DeployError::Record(format!("failed to create {}: {e}", parent.display()))
            })?;
        }

        std::fs::write(path, json)
            .map_err(|e| DeployError::Record(format!("failed to write {}: {e}", path.display())))?;

        tracing::info!(
            path = %path.display(),
            contracts = self.contracts.len(),
            "Deployment record saved"
        );
        Ok(())
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| DeployError::Record(format!("failed to read {}: {e}", path.display())))?;
        serde_json::from_str(&content)
            .map_err(|e| DeployError::Record(format!("failed to parse {}: {e}", path.display())))
    }
}

/// `incubation` -> `INCUBATION_CONTRACT_ADDRESS`.
pub fn env_var_name(contract: &str) -> String {
    format!("{}_CONTRACT_ADDRESS", contract.to_uppercase().replace('-', "_"))
}

/// Table of contract, address and explorer link.
pub fn summary_table(deployments: &Deployments, profile: &NetworkProfile) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Contract", "Address", "Explorer"]);
    for result in deployments.iter() {
        table.add_row(vec![
            result.name.clone(),
            result.address.clone(),
            profile.explorer_tx_url(&result.tx_id),
        ]);
    }
    table
}

/// `KEY=value` lines to paste into the frontend's environment file.
pub fn env_lines(deployments: &Deployments) -> Vec<String> {
    deployments
        .iter()
        .map(|r| format!("{}={}", env_var_name(&r.name), r.address))
        .collect()
}
