//! Offline assembly of a signed account transaction.
//!
//! [`assemble`] runs the order-sensitive part of the pipeline without any
//! network access:
//!
//! 1. serialize the body and take its base energy;
//! 2. build the header from the body size and signature count;
//! 3. serialize the header;
//! 4. sign `SHA-256(header ‖ body)` with every key.
//!
//! The result is a [`SignedTransaction`]. It is never mutated; a new nonce
//! means assembling a new one.

use thiserror::Error;

use super::header::{Header, HeaderBuilder, TransactionError};
use super::payload::{Payload, PayloadError};
use super::signing::{signature_count, transaction_digest, CredentialSet, SignatureBlock, SigningError};
use super::types::{AccountAddress, TransactionHash, TransactionTime};
use crate::codec::Reader;
use crate::config::{BLOCK_ITEM_KIND_ACCOUNT_TRANSACTION, HEADER_SIZE};
use crate::crypto::hash::sha256_concat;

/// Anything that can go wrong while assembling or parsing a transaction.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AssemblyError {
    #[error("payload: {0}")]
    Payload(#[from] PayloadError),

    #[error("header: {0}")]
    Transaction(#[from] TransactionError),

    #[error("signing: {0}")]
    Signing(#[from] SigningError),
}

// ---------------------------------------------------------------------------
// SignedTransaction
// ---------------------------------------------------------------------------

/// A fully signed transaction: `signatures ‖ header ‖ body`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    signatures: SignatureBlock,
    header: Header,
    body: Vec<u8>,
}

impl SignedTransaction {
    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn signatures(&self) -> &SignatureBlock {
        &self.signatures
    }

    /// The serialized body.
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Parses the body back into a [`Payload`].
    pub fn payload(&self) -> Result<Payload, PayloadError> {
        Payload::decode(&self.body)
    }

    /// Digest the signatures were made over.
    pub fn digest(&self) -> [u8; 32] {
        transaction_digest(&self.header.serialize(), &self.body)
    }

    /// The bytes sent to the node.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out =
            Vec::with_capacity(self.signatures.encoded_len() + HEADER_SIZE + self.body.len());
        out.extend_from_slice(&self.signatures.to_bytes());
        out.extend_from_slice(&self.header.serialize());
        out.extend_from_slice(&self.body);
        out
    }

    /// Hash the node reports the transaction under:
    /// `SHA-256(block item kind ‖ transaction bytes)`.
    pub fn hash(&self) -> TransactionHash {
        let raw = self.to_bytes();
        let kind = [BLOCK_ITEM_KIND_ACCOUNT_TRANSACTION];
        TransactionHash::new(sha256_concat(&[kind.as_slice(), raw.as_slice()]))
    }

    /// Parses raw transaction bytes. The body is checked against the size
    /// the header declares and must parse as a known payload.
    pub fn decode(bytes: &[u8]) -> Result<Self, AssemblyError> {
        let mut reader = Reader::new(bytes);
        let signatures = SignatureBlock::read(&mut reader)?;
        let header_bytes = reader
            .read_bytes(HEADER_SIZE)
            .map_err(TransactionError::from)?;
        let header = Header::decode(header_bytes)?;

        let rest = reader.remaining();
        let body = reader.read_bytes(rest).map_err(TransactionError::from)?;
        if body.len() != header.body_size() as usize {
            return Err(TransactionError::BodySizeMismatch {
                declared: header.body_size(),
                actual: body.len(),
            }
            .into());
        }
        Payload::decode(body)?;

        Ok(Self {
            signatures,
            header,
            body: body.to_vec(),
        })
    }
}

// ---------------------------------------------------------------------------
// assemble
// ---------------------------------------------------------------------------

/// Builds and signs a transaction with an explicit nonce and expiry.
pub fn assemble(
    sender: AccountAddress,
    nonce: u64,
    expiry: TransactionTime,
    payload: &Payload,
    credentials: &CredentialSet,
) -> Result<SignedTransaction, AssemblyError> {
    let body = payload.encode()?;

    let header = HeaderBuilder::new(sender)
        .nonce(nonce)
        .expiry(expiry)
        .finish_for_body(&body, signature_count(credentials))?;

    let header_bytes = header.serialize();
    let signatures = SignatureBlock::sign(&header_bytes, &body.bytes, credentials)?;

    Ok(SignedTransaction {
        signatures,
        header,
        body: body.bytes,
    })
}
