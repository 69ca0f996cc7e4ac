//! Ledger access: reading the deployer's nonce and broadcasting transactions.

use std::{future::Future, time::Duration};

use reqwest::{StatusCode, header};
use serde::Deserialize;
use serde_json::Value;

use crate::{
    address::StacksAddress,
    error::{DeployError, Result},
    network::NetworkProfile,
    transaction::SignedTransaction,
};

/// Default timeout for node API requests.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Rejection reason reported by the node when the nonce is out of order.
const BAD_NONCE_REASON: &str = "BadNonce";

/// How the ledger answered a broadcast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BroadcastOutcome {
    /// The node accepted the transaction into its mempool.
    Accepted { txid: String },
    /// The node expects a different nonce for the sender.
    NonceConflict { expected: u64 },
    /// Any other rejection.
    Rejected(Rejection),
}

/// A non-conflict rejection as reported by the node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub error: String,
    pub reason: Option<String>,
    /// Raw `reason_data` or response text, for the operator.
    pub detail: Option<String>,
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.error)?;
        if let Some(reason) = &self.reason {
            write!(f, " ({reason})")?;
        }
        if let Some(detail) = &self.detail {
            write!(f, ": {detail}")?;
        }
        Ok(())
    }
}

/// The request/response boundary to a Stacks node.
pub trait LedgerClient {
    /// The next nonce the ledger expects from `address`.
    fn account_nonce(&self, address: &StacksAddress) -> impl Future<Output = Result<u64>> + Send;

    /// Submit a signed transaction.
    fn broadcast(
        &self,
        tx: &SignedTransaction,
    ) -> impl Future<Output = Result<BroadcastOutcome>> + Send;
}

/// Account state returned by `/v2/accounts/<address>`.
#[derive(Debug, Deserialize)]
struct AccountInfo {
    #[serde(default)]
    nonce: u64,
}

/// Error body returned by `/v2/transactions`.
#[derive(Debug, Deserialize)]
struct BroadcastError {
    error: String,
    #[serde(default)]
    reason: Option<String>,
    #[serde(default)]
    reason_data: Option<Value>,
}

/// Parse the body of an account query.
pub fn parse_account_nonce(body: &str) -> Result<u64> {
    let account: AccountInfo = serde_json::from_str(body)
        .map_err(|e| DeployError::AccountQueryFailed(format!("invalid account body: {e}")))?;
    Ok(account.nonce)
}

/// Classify the answer of a broadcast request.
pub fn classify_broadcast_response(status: StatusCode, body: &str) -> BroadcastOutcome {
    let parsed: Option<Value> = serde_json::from_str(body).ok();

    if status.is_success() {
        let txid = match &parsed {
            Some(Value::String(txid)) => Some(txid.clone()),
            Some(Value::Object(map)) => map.get("txid").and_then(Value::as_str).map(String::from),
            _ => None,
        };
        if let Some(txid) = txid {
            return BroadcastOutcome::Accepted { txid };
        }
    }

    let rejection = parsed.and_then(|value| serde_json::from_value::<BroadcastError>(value).ok());
    match rejection {
        Some(err) => {
            if err.reason.as_deref() == Some(BAD_NONCE_REASON) {
                let expected = err
                    .reason_data
                    .as_ref()
                    .and_then(|data| data.get("expected"))
                    .and_then(Value::as_u64);
                if let Some(expected) = expected {
                    return BroadcastOutcome::NonceConflict { expected };
                }
            }
            BroadcastOutcome::Rejected(Rejection {
                error: err.error,
                reason: err.reason,
                detail: err.reason_data.map(|data| data.to_string()),
            })
        }
        None => BroadcastOutcome::Rejected(Rejection {
            error: format!("unexpected response (HTTP {status})"),
            reason: None,
            detail: Some(body.trim().to_string()).filter(|b| !b.is_empty()),
        }),
    }
}

/// Create an HTTP client for the node API.
pub fn create_client() -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder().timeout(DEFAULT_TIMEOUT).build()?)
}

/// [`LedgerClient`] talking to a Stacks node over HTTP.
#[derive(Debug, Clone)]
pub struct StacksNodeClient {
    client: reqwest::Client,
    profile: NetworkProfile,
}

impl StacksNodeClient {
    pub fn new(profile: NetworkProfile) -> Result<Self> {
        Ok(Self {
            client: create_client()?,
            profile,
        })
    }
}

impl LedgerClient for StacksNodeClient {
    async fn account_nonce(&self, address: &StacksAddress) -> Result<u64> {
        let url = self.profile.account_url(address);
        tracing::debug!(url = %url, "Fetching account nonce");

        let response = self
            .client
            .get(&url)
            .header(header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| DeployError::AccountQueryFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DeployError::AccountQueryFailed(format!("HTTP {status}")));
        }

        let body = response
            .text()
            .await
            .map_err(|e| DeployError::AccountQueryFailed(e.to_string()))?;
        parse_account_nonce(&body)
    }

    async fn broadcast(&self, tx: &SignedTransaction) -> Result<BroadcastOutcome> {
        let response = self
            .client
            .post(self.profile.transactions_url())
            .header(header::CONTENT_TYPE, "application/octet-stream")
            .body(tx.as_bytes().to_vec())
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        tracing::trace!(status = %status, body = %body, "Broadcast response");

        Ok(classify_broadcast_response(status, &body))
    }
}
