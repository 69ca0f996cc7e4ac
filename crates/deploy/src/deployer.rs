use crate::{
    BroadcastOutcome, ContractDeploy, ContractJob, DeployConfig, DeployError, DeployerKey,
    DeploymentAborted, DeploymentRecord, DeploymentResult, Deployments, LedgerClient,
    NetworkProfile, SequenceTracker, StacksAddress,
};

/// Publishes the configured contracts one after the other.
///
/// Submission is strictly sequential: every transaction must use the nonce
/// following the previous one, so nothing is ever in flight concurrently.
#[derive(Debug)]
pub struct Deployer<L> {
    ledger: L,
    key: DeployerKey,
    profile: NetworkProfile,
    address: StacksAddress,
    config: DeployConfig,
}

impl<L: LedgerClient> Deployer<L> {
    pub fn new(ledger: L, key: DeployerKey, profile: NetworkProfile, config: DeployConfig) -> Self {
        let address = key.address(&profile);
        Self {
            ledger,
            key,
            profile,
            address,
            config,
        }
    }

    /// The address contracts are published under.
    pub fn address(&self) -> &StacksAddress {
        &self.address
    }

    pub fn profile(&self) -> &NetworkProfile {
        &self.profile
    }

    pub fn config(&self) -> &DeployConfig {
        &self.config
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    /// Seed the nonce from the ledger and publish every job.
    pub async fn deploy(
        &self,
        jobs: &[ContractJob],
    ) -> Result<DeploymentRecord, DeploymentAborted> {
        tracing::info!(
            network = %self.profile.network,
            api_url = %self.profile.api_url,
            deployer = %self.address,
            contracts = jobs.len(),
            nonce_conflict_prone = self.profile.nonce_conflict_prone,
            "Deploying contracts to {}...",
            self.profile.label
        );

        let mut tracker = SequenceTracker::initialize(&self.ledger, &self.address).await;
        let contracts = self.deploy_all(jobs, &mut tracker).await?;

        Ok(DeploymentRecord::new(
            self.profile.network.as_ref(),
            &self.address,
            contracts,
        ))
    }

    /// Publish every job in order, starting from the tracker's nonce.
    ///
    /// The first fatal error stops the run; the contracts published before it
    /// are returned alongside the cause.
    pub async fn deploy_all(
        &self,
        jobs: &[ContractJob],
        tracker: &mut SequenceTracker,
    ) -> Result<Deployments, DeploymentAborted> {
        let mut completed = Deployments::new();

        for (index, job) in jobs.iter().enumerate() {
            match self.deploy_one(job, tracker).await {
                Ok(result) => completed.push(result),
                Err(cause) => {
                    tracing::error!(
                        contract = %job.name(),
                        error = %cause,
                        deployed = completed.len(),
                        total = jobs.len(),
                        "Deployment aborted"
                    );
                    return Err(DeploymentAborted {
                        cause,
                        completed,
                        total: jobs.len(),
                    });
                }
            }

            if index + 1 < jobs.len() {
                let delay = self.config.inter_job_delay();
                tracing::info!(delay_secs = delay.as_secs(), "Waiting before next deployment...");
                tokio::time::sleep(delay).await;
            }
        }

        Ok(completed)
    }

    /// Publish a single contract, correcting the nonce on conflicts.
    async fn deploy_one(
        &self,
        job: &ContractJob,
        tracker: &mut SequenceTracker,
    ) -> Result<DeploymentResult, DeployError> {
        let max_attempts = self.config.max_attempts();
        let mut attempts = 0;

        loop {
            attempts += 1;
            let nonce = tracker.current();

            let tx = ContractDeploy::new(&self.profile, &self.key, job.name(), job.source(), nonce)
                .sign(&self.key)?;

            tracing::info!(
                contract = %job.name(),
                nonce,
                fee = tx.fee(),
                attempt = attempts,
                "Broadcasting contract..."
            );

            match self.ledger.broadcast(&tx).await? {
                BroadcastOutcome::Accepted { txid } => {
                    tracker.advance();
                    let address = self.address.contract_id(job.name());
                    tracing::info!(
                        contract = %job.name(),
                        address = %address,
                        txid = %txid,
                        explorer = %self.profile.explorer_tx_url(&txid),
                        "Contract deployed"
                    );
                    return Ok(DeploymentResult {
                        name: job.name().to_string(),
                        tx_id: txid,
                        address,
                    });
                }
                BroadcastOutcome::NonceConflict { expected } if expected != nonce => {
                    let conflict = DeployError::SequenceConflict {
                        used: nonce,
                        expected,
                    };
                    tracing::warn!(contract = %job.name(), error = %conflict, "Nonce mismatch");
                    tracker.correct(expected);

                    if attempts >= max_attempts {
                        return Err(DeployError::RetriesExhausted {
                            contract: job.name().to_string(),
                            attempts,
                        });
                    }
                    tracing::info!(
                        contract = %job.name(),
                        nonce = expected,
                        "Retrying with corrected nonce..."
                    );
                }
                BroadcastOutcome::NonceConflict { expected } => {
                    return Err(DeployError::DeploymentRejected {
                        contract: job.name().to_string(),
                        reason: format!("BadNonce although the expected nonce {expected} was used"),
                    });
                }
                BroadcastOutcome::Rejected(rejection) => {
                    return Err(DeployError::DeploymentRejected {
                        contract: job.name().to_string(),
                        reason: rejection.to_string(),
                    });
                }
            }
        }
    }
}
