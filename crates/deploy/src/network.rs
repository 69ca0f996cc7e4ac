//! Network profiles for the supported Stacks environments.

use url::Url;

use crate::{
    address::{MAINNET_SINGLESIG_VERSION, TESTNET_SINGLESIG_VERSION},
    error::{DeployError, Result},
};

/// Default RPC endpoint of a local devnet node.
pub const DEVNET_DEFAULT_RPC_URL: &str = "http://localhost:20443";
/// Public Stacks node API for mainnet.
pub const MAINNET_API_URL: &str = "https://stacks-node-api.mainnet.stacks.co";
/// Public Stacks node API for testnet.
pub const TESTNET_API_URL: &str = "https://stacks-node-api.testnet.stacks.co";

/// Static fee (in micro-STX) for a contract deployment on mainnet.
pub const MAINNET_DEPLOY_FEE: u64 = 50_000;
/// Static fee (in micro-STX) for a contract deployment on testnet and devnet.
pub const DEFAULT_DEPLOY_FEE: u64 = 10_000;

const EXPLORER_URL: &str = "https://explorer.stacks.co";

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumString, strum::AsRefStr,
)]
#[strum(serialize_all = "lowercase")]
pub enum Network {
    Mainnet,
    Testnet,
    Devnet,
}

impl Network {
    /// Select a network by name.
    ///
    /// Unknown names fall back to devnet so that a typo can never reach mainnet.
    pub fn select(name: &str) -> Self {
        match name {
            "mainnet" => Network::Mainnet,
            "testnet" => Network::Testnet,
            "devnet" | "" => Network::Devnet,
            other => {
                tracing::warn!(
                    network = %other,
                    "Unrecognized network name, falling back to devnet"
                );
                Network::Devnet
            }
        }
    }
}

/// Everything the deployer needs to know about the target ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkProfile {
    pub network: Network,
    /// Base URL of the node API, without trailing slash.
    pub api_url: String,
    /// Address version byte used to derive the deployer's address.
    pub address_version: u8,
    /// Transaction version byte (`0x00` mainnet, `0x80` testnet).
    pub transaction_version: u8,
    pub chain_id: u32,
    pub label: &'static str,
    /// Busy networks where competing submissions make nonce conflicts more likely.
    pub nonce_conflict_prone: bool,
    /// Static fee paid for each deployment, in micro-STX.
    pub deploy_fee: u64,
}

impl NetworkProfile {
    /// Build the profile for a network.
    ///
    /// `rpc_url_override` is honored for devnet only.
    pub fn new(network: Network, rpc_url_override: Option<&str>) -> Result<Self> {
        let profile = match network {
            Network::Mainnet => Self {
                network,
                api_url: MAINNET_API_URL.to_string(),
                address_version: MAINNET_SINGLESIG_VERSION,
                transaction_version: 0x00,
                chain_id: 0x0000_0001,
                label: "Stacks Mainnet",
                nonce_conflict_prone: true,
                deploy_fee: MAINNET_DEPLOY_FEE,
            },
            Network::Testnet => Self {
                network,
                api_url: TESTNET_API_URL.to_string(),
                address_version: TESTNET_SINGLESIG_VERSION,
                transaction_version: 0x80,
                chain_id: 0x8000_0000,
                label: "Stacks Testnet",
                nonce_conflict_prone: false,
                deploy_fee: DEFAULT_DEPLOY_FEE,
            },
            Network::Devnet => {
                let url = rpc_url_override.unwrap_or(DEVNET_DEFAULT_RPC_URL);
                if !validate_url(url) {
                    return Err(DeployError::InvalidRpcUrl(url.to_string()));
                }
                Self {
                    network,
                    api_url: url.trim_end_matches('/').to_string(),
                    address_version: TESTNET_SINGLESIG_VERSION,
                    transaction_version: 0x80,
                    chain_id: 0x8000_0000,
                    label: "Stacks Devnet",
                    nonce_conflict_prone: false,
                    deploy_fee: DEFAULT_DEPLOY_FEE,
                }
            }
        };

        if let (Some(url), false) = (rpc_url_override, network == Network::Devnet) {
            tracing::warn!(
                rpc_url = %url,
                network = %network,
                "RPC URL override is only used on devnet, ignoring"
            );
        }

        Ok(profile)
    }

    /// The account endpoint used to read the deployer's nonce.
    pub fn account_url(&self, address: &str) -> String {
        format!("{}/v2/accounts/{}", self.api_url, address)
    }

    /// The broadcast endpoint.
    pub fn transactions_url(&self) -> String {
        format!("{}/v2/transactions", self.api_url)
    }

    /// Where an operator can look a transaction up.
    pub fn explorer_tx_url(&self, txid: &str) -> String {
        match self.network {
            Network::Mainnet => format!("{EXPLORER_URL}/txid/{txid}"),
            Network::Testnet => format!("{EXPLORER_URL}/?chain=testnet&txid={txid}"),
            Network::Devnet => format!("{}/extended/v1/tx/{}", self.api_url, txid),
        }
    }
}

/// Validate that a URL is well-formed and uses HTTP or HTTPS.
pub fn validate_url(url: &str) -> bool {
    match Url::parse(url) {
        Ok(parsed) => {
            let scheme = parsed.scheme();
            (scheme == "http" || scheme == "https") && parsed.host().is_some()
        }
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn test_select_known_networks() {
        assert_eq!(Network::select("mainnet"), Network::Mainnet);
        assert_eq!(Network::select("testnet"), Network::Testnet);
        assert_eq!(Network::select("devnet"), Network::Devnet);
    }

    #[test]
    fn test_select_falls_back_to_devnet() {
        assert_eq!(Network::select(""), Network::Devnet);
        assert_eq!(Network::select("Mainnet"), Network::Devnet);
        assert_eq!(Network::select("mainet"), Network::Devnet);
    }

    #[test]
    fn test_network_string_forms() {
        assert_eq!(Network::Mainnet.to_string(), "mainnet");
        assert_eq!(Network::from_str("testnet").unwrap(), Network::Testnet);
        assert_eq!(Network::Devnet.as_ref(), "devnet");
    }

    #[test]
    fn test_devnet_default_and_override() {
        let profile = NetworkProfile::new(Network::Devnet, None).unwrap();
        assert_eq!(profile.api_url, DEVNET_DEFAULT_RPC_URL);

        let profile = NetworkProfile::new(Network::Devnet, Some("http://10.0.0.5:3999/")).unwrap();
        assert_eq!(profile.api_url, "http://10.0.0.5:3999");
        assert_eq!(
            profile.account_url("ST000000000000000000002AMW42H"),
            "http://10.0.0.5:3999/v2/accounts/ST000000000000000000002AMW42H"
        );
    }

    #[test]
    fn test_devnet_rejects_invalid_override() {
        let result = NetworkProfile::new(Network::Devnet, Some("ftp://node"));
        assert!(matches!(result, Err(DeployError::InvalidRpcUrl(_))));
    }

    #[test]
    fn test_override_ignored_outside_devnet() {
        let profile = NetworkProfile::new(Network::Testnet, Some("http://localhost:1")).unwrap();
        assert_eq!(profile.api_url, TESTNET_API_URL);
    }

    #[test]
    fn test_fee_table() {
        let mainnet = NetworkProfile::new(Network::Mainnet, None).unwrap();
        let testnet = NetworkProfile::new(Network::Testnet, None).unwrap();
        assert_eq!(mainnet.deploy_fee, MAINNET_DEPLOY_FEE);
        assert_eq!(testnet.deploy_fee, DEFAULT_DEPLOY_FEE);
        assert!(mainnet.deploy_fee > testnet.deploy_fee);
    }

    #[test]
    fn test_explorer_urls() {
        let mainnet = NetworkProfile::new(Network::Mainnet, None).unwrap();
        let testnet = NetworkProfile::new(Network::Testnet, None).unwrap();
        let devnet = NetworkProfile::new(Network::Devnet, None).unwrap();

        assert_eq!(
            mainnet.explorer_tx_url("0xabc"),
            "https://explorer.stacks.co/txid/0xabc"
        );
        assert_eq!(
            testnet.explorer_tx_url("0xabc"),
            "https://explorer.stacks.co/?chain=testnet&txid=0xabc"
        );
        assert_eq!(
            devnet.explorer_tx_url("0xabc"),
            "http://localhost:20443/extended/v1/tx/0xabc"
        );
    }
}
