//! incubant-deploy - Deployment library for the Incubant Clarity contracts.
//!
//! This crate resolves the operator's signing key, reads the deployer's nonce
//! from a Stacks node, publishes the contracts in a fixed order (correcting the
//! nonce when the node reports a conflict) and records what was deployed.

pub mod address;
mod config;
pub mod contracts;
mod deployer;
mod error;
pub mod keys;
pub mod network;
pub mod record;
pub mod rpc;
mod sequence;
pub mod transaction;

pub use address::StacksAddress;
pub use config::{
    DEFAULT_CONTRACTS_DIR, DEFAULT_INTER_JOB_DELAY_SECS, DEFAULT_MAX_RETRIES, DEFAULT_RECORD_PATH,
    DeployConfig,
};
pub use contracts::{ContractJob, DEFAULT_CONTRACTS, load_jobs};
pub use deployer::Deployer;
pub use error::{DeployError, DeploymentAborted, Result};
pub use keys::{DeployerKey, resolve_secret};
pub use network::{Network, NetworkProfile};
pub use record::{DeploymentRecord, DeploymentResult, Deployments};
pub use rpc::{BroadcastOutcome, LedgerClient, Rejection, StacksNodeClient};
pub use sequence::SequenceTracker;
pub use transaction::{ContractDeploy, SignedTransaction};
