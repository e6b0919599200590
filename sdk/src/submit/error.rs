//! Error types for the submission pipeline.
//!
//! Each [`SubmitError`] variant corresponds to one stage of the pipeline, so
//! a caller can always tell how far a request got. Only
//! [`SubmitError::Submission`] and [`SubmitError::Timeout`] at the
//! submission stage leave it unclear whether the node saw the transaction.

use std::fmt;

use thiserror::Error;

use crate::transaction::{AddressError, AssemblyError, SigningError};

/// A node call that can time out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    NonceQuery,
    Submission,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonceQuery => write!(f, "nonce query"),
            Self::Submission => write!(f, "submission"),
        }
    }
}

/// Request problems caught before any node call is made.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("sender address is empty")]
    EmptySender,

    #[error("invalid sender address: {0}")]
    InvalidSender(#[from] AddressError),

    /// Empty set, a credential without keys, or a key that does not decode.
    #[error("invalid credentials: {0}")]
    Credentials(#[from] SigningError),
}

/// Errors from [`Submitter::submit`](super::Submitter::submit).
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("invalid request: {0}")]
    Validation(#[from] ValidationError),

    /// The node could not promise the nonce is final. Submitting with it
    /// risks a rejected or duplicate transaction.
    #[error("next nonce {nonce} is not final; refusing to submit")]
    UnreliableNonce { nonce: u64 },

    #[error("failed to assemble transaction: {0}")]
    Assembly(#[from] AssemblyError),

    #[error("nonce query failed: {0}")]
    NonceQuery(#[source] anyhow::Error),

    #[error("submission failed: {0}")]
    Submission(#[source] anyhow::Error),

    #[error("{stage} timed out")]
    Timeout { stage: Stage },
}

impl SubmitError {
    /// `true` when the node was never handed the transaction bytes.
    pub fn is_before_submission(&self) -> bool {
        !matches!(
            self,
            Self::Submission(_)
                | Self::Timeout {
                    stage: Stage::Submission
                }
        )
    }
}
