//! # Transaction Submission
//!
//! Drives a [`TransactionRequest`] through to an on-chain outcome:
//!
//! 1. **Validate** the sender address and every key. Nothing touches the
//!    network until this passes.
//! 2. **Resolve** the network id and expiry from the request or the
//!    [`ClientConfig`] defaults.
//! 3. **Query** the next nonce. A nonce the node cannot vouch for is
//!    refused with [`SubmitError::UnreliableNonce`].
//! 4. **Assemble** body, header and signatures with
//!    [`assemble`](crate::transaction::assemble).
//! 5. **Submit** the raw bytes and wait for the outcome.
//!
//! Any failure ends the pipeline. Nothing is retried, and a transaction is
//! only ever sent whole.
//!
//! Nonce acquisition is not serialized here. Two concurrent submissions for
//! the same sender can race for the same nonce; callers that care must
//! submit one at a time per sender.

mod client;
mod error;

use std::future::Future;

use tracing::{debug, info, warn};

use crate::config::ClientConfig;
use crate::transaction::signing::check_credentials;
use crate::transaction::{
    assemble, AccountAddress, Amount, ContractAddress, CredentialSet, ModuleRef, Parameter,
    Payload, TransactionHash, TransactionTime,
};

pub use client::{NextNonce, NodeClient, TransactionOutcome};
pub use error::{Stage, SubmitError, ValidationError};

// ---------------------------------------------------------------------------
// TransactionRequest
// ---------------------------------------------------------------------------

/// Everything needed to submit one transaction, minus the nonce.
#[derive(Debug, Clone)]
pub struct TransactionRequest {
    sender: String,
    credentials: CredentialSet,
    payload: Payload,
    network_id: Option<u32>,
    expiry: Option<TransactionTime>,
}

impl TransactionRequest {
    /// `sender` is the base58check account address.
    pub fn new(sender: impl Into<String>, credentials: CredentialSet, payload: Payload) -> Self {
        Self {
            sender: sender.into(),
            credentials,
            payload,
            network_id: None,
            expiry: None,
        }
    }

    /// Overrides the configured network id.
    pub fn network_id(mut self, network_id: u32) -> Self {
        self.network_id = Some(network_id);
        self
    }

    /// Overrides the default expiry window.
    pub fn expiry(mut self, expiry: TransactionTime) -> Self {
        self.expiry = Some(expiry);
        self
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    /// Checks the request without any network access and returns the
    /// parsed sender.
    pub fn validate(&self) -> Result<AccountAddress, ValidationError> {
        if self.sender.trim().is_empty() {
            return Err(ValidationError::EmptySender);
        }
        let sender = AccountAddress::from_base58check(&self.sender)?;
        check_credentials(&self.credentials)?;
        Ok(sender)
    }
}

/// A transaction the node has processed.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionResult {
    pub hash: TransactionHash,
    pub nonce: u64,
    pub outcome: TransactionOutcome,
}

// ---------------------------------------------------------------------------
// Submitter
// ---------------------------------------------------------------------------

/// Runs the submission pipeline against a [`NodeClient`].
pub struct Submitter<C> {
    client: C,
    config: ClientConfig,
}

impl<C: NodeClient> Submitter<C> {
    pub fn new(client: C, config: ClientConfig) -> Self {
        Self { client, config }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Validates, assembles, signs and submits `request`, then waits for
    /// the outcome.
    pub async fn submit(
        &self,
        request: TransactionRequest,
    ) -> Result<SubmissionResult, SubmitError> {
        let sender = request.validate().map_err(|e| {
            warn!(error = %e, "rejecting invalid transaction request");
            e
        })?;

        let network_id = request.network_id.unwrap_or(self.config.network_id);
        let expiry = request
            .expiry
            .unwrap_or_else(|| TransactionTime::expiring_in(self.config.expiry_window()));

        debug!(sender = %sender, "querying next nonce");
        let next = self
            .with_deadline(Stage::NonceQuery, self.client.next_account_nonce(&sender))
            .await?
            .map_err(|e| {
                SubmitError::NonceQuery(e.context(format!("next nonce for {}", sender)))
            })?;
        if !next.all_final {
            warn!(sender = %sender, nonce = next.nonce, "nonce is not final, not submitting");
            return Err(SubmitError::UnreliableNonce { nonce: next.nonce });
        }

        let tx = assemble(
            sender,
            next.nonce,
            expiry,
            &request.payload,
            &request.credentials,
        )?;
        let raw = tx.to_bytes();
        let hash = tx.hash();

        info!(
            sender = %sender,
            kind = request.payload.kind(),
            nonce = next.nonce,
            energy = tx.header().energy(),
            size = raw.len(),
            network_id,
            hash = %hash,
            "submitting transaction"
        );

        let outcome = self
            .with_deadline(
                Stage::Submission,
                self.client.send_transaction_and_await(network_id, &raw),
            )
            .await?
            .map_err(|e| {
                SubmitError::Submission(e.context(format!(
                    "transaction {} on network {}",
                    hash, network_id
                )))
            })?;

        if outcome.success {
            info!(hash = %hash, "transaction succeeded");
        } else {
            warn!(
                hash = %hash,
                reason = outcome.reject_reason.as_deref().unwrap_or("unknown"),
                "transaction rejected"
            );
        }

        Ok(SubmissionResult {
            hash,
            nonce: next.nonce,
            outcome,
        })
    }

    /// Deploys a wasm module.
    pub async fn deploy_module(
        &self,
        sender: &str,
        credentials: CredentialSet,
        wasm: Vec<u8>,
    ) -> Result<SubmissionResult, SubmitError> {
        self.submit(TransactionRequest::new(
            sender,
            credentials,
            Payload::deploy_module(wasm),
        ))
        .await
    }

    /// Creates a contract instance from a deployed module.
    pub async fn init_contract(
        &self,
        sender: &str,
        credentials: CredentialSet,
        amount: Amount,
        module_ref: ModuleRef,
        contract_name: &str,
        param: Parameter,
    ) -> Result<SubmissionResult, SubmitError> {
        self.submit(TransactionRequest::new(
            sender,
            credentials,
            Payload::init_contract(amount, module_ref, contract_name, param),
        ))
        .await
    }

    /// Calls `receive_name` (`contract.entrypoint`) on a contract instance.
    pub async fn update_contract(
        &self,
        sender: &str,
        credentials: CredentialSet,
        amount: Amount,
        address: ContractAddress,
        receive_name: &str,
        param: Parameter,
    ) -> Result<SubmissionResult, SubmitError> {
        self.submit(TransactionRequest::new(
            sender,
            credentials,
            Payload::update_contract_with_receive_name(amount, address, receive_name, param),
        ))
        .await
    }

    /// Transfers `amount` to `to`.
    pub async fn transfer(
        &self,
        sender: &str,
        credentials: CredentialSet,
        to: AccountAddress,
        amount: Amount,
    ) -> Result<SubmissionResult, SubmitError> {
        self.submit(TransactionRequest::new(
            sender,
            credentials,
            Payload::transfer(to, amount),
        ))
        .await
    }

    async fn with_deadline<T>(
        &self,
        stage: Stage,
        call: impl Future<Output = T>,
    ) -> Result<T, SubmitError> {
        match self.config.rpc_timeout() {
            Some(deadline) => tokio::time::timeout(deadline, call).await.map_err(|_| {
                warn!(%stage, ?deadline, "node call timed out");
                SubmitError::Timeout { stage }
            }),
            None => Ok(call.await),
        }
    }
}
