//! The node interface the submission pipeline depends on.
//!
//! The transport (gRPC, JSON-RPC, an in-process test double) lives outside
//! this crate. It only has to answer two questions: what nonce comes next
//! for an account, and what happened to a transaction once submitted.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::transaction::AccountAddress;

/// The node's answer to a next-nonce query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NextNonce {
    pub nonce: u64,
    /// `true` when every transaction from the account is finalized, so the
    /// nonce cannot be taken by something still in flight.
    pub all_final: bool,
}

/// What the chain did with a submitted transaction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionOutcome {
    pub success: bool,
    #[serde(default)]
    pub events: Vec<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reject_reason: Option<String>,
}

/// Boundary to a running node.
#[async_trait]
pub trait NodeClient: Send + Sync {
    /// Next nonce for `address`. Fails if the account does not exist.
    async fn next_account_nonce(&self, address: &AccountAddress) -> anyhow::Result<NextNonce>;

    /// Sends raw transaction bytes and waits for the outcome.
    async fn send_transaction_and_await(
        &self,
        network_id: u32,
        raw: &[u8],
    ) -> anyhow::Result<TransactionOutcome>;
}

#[async_trait]
impl<T: NodeClient + ?Sized> NodeClient for Arc<T> {
    async fn next_account_nonce(&self, address: &AccountAddress) -> anyhow::Result<NextNonce> {
        (**self).next_account_nonce(address).await
    }

    async fn send_transaction_and_await(
        &self,
        network_id: u32,
        raw: &[u8],
    ) -> anyhow::Result<TransactionOutcome> {
        (**self).send_transaction_and_await(network_id, raw).await
    }
}
