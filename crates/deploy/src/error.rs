use std::path::PathBuf;

use thiserror::Error;

use crate::record::Deployments;

pub type Result<T> = std::result::Result<T, DeployError>;

#[derive(Debug, Error)]
pub enum DeployError {
    /// Neither a secret key nor a mnemonic was configured.
    #[error("DEPLOYER_SECRET_KEY or DEPLOYER_MNEMONIC must be set")]
    MissingSecret,

    /// The mnemonic phrase failed BIP-39 validation or key derivation.
    #[error("invalid mnemonic phrase (expected 12 or 24 words with a valid checksum): {0}")]
    InvalidMnemonic(String),

    /// The raw key is not 64 hex characters, optionally followed by `01`.
    #[error(
        "invalid secret key format: received {length} characters, expected 64 hex characters optionally followed by '01' (64 or 66 total)"
    )]
    InvalidKeyFormat { length: usize },

    /// The key has the right shape but is not a usable secp256k1 scalar.
    #[error("invalid secp256k1 secret key: {0}")]
    InvalidKey(String),

    #[error("invalid RPC URL '{0}': expected an http(s) URL")]
    InvalidRpcUrl(String),

    #[error("invalid contract name '{0}'")]
    InvalidContractName(String),

    #[error("failed to load contract source for '{name}' from {}: {reason}", path.display())]
    ContractSource {
        name: String,
        path: PathBuf,
        reason: String,
    },

    /// Non-fatal: the caller falls back to nonce 0.
    #[error("failed to query account: {0}")]
    AccountQueryFailed(String),

    #[error("nonce conflict: used {used}, ledger expected {expected}")]
    SequenceConflict { used: u64, expected: u64 },

    #[error("deployment of '{contract}' rejected: {reason}")]
    DeploymentRejected { contract: String, reason: String },

    #[error("deployment of '{contract}' still conflicting after {attempts} attempts")]
    RetriesExhausted { contract: String, attempts: u32 },

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("deployment record error: {0}")]
    Record(String),
}

/// A fatal error raised mid-run, together with what had been deployed before it.
#[derive(Debug, Error)]
#[error("deployment aborted after {}/{total} contracts: {cause}", completed.len())]
pub struct DeploymentAborted {
    #[source]
    pub cause: DeployError,
    pub completed: Deployments,
    pub total: usize,
}
