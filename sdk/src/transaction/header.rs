//! Transaction header and its builder.
//!
//! The header is a fixed 60-byte big-endian record:
//!
//! ```text
//! sender [32] ‖ nonce u64 ‖ energy u64 ‖ body size u32 ‖ expiry u64
//! ```
//!
//! The energy field depends on the size of the whole transaction, which
//! includes this header. The header size is constant, so the builder can
//! compute energy from the encoded body and the signature count before the
//! header is ever serialized. A finished [`Header`] is immutable.

use bytes::BufMut;
use thiserror::Error;

use super::energy::energy_for_body;
use super::payload::EncodedPayload;
use super::types::{AccountAddress, TransactionTime};
use crate::codec::{CodecError, Reader};
use crate::config::HEADER_SIZE;

/// Header construction and parsing errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransactionError {
    /// A required builder field was never set.
    #[error("header field `{0}` was not set")]
    MissingHeaderField(&'static str),

    /// The body does not fit the 4-byte size field.
    #[error("body of {0} bytes exceeds the u32 size field")]
    BodyTooLarge(usize),

    #[error("header must be {expected} bytes, got {actual}")]
    InvalidHeaderLength { expected: usize, actual: usize },

    /// The declared body size disagrees with the bytes that follow.
    #[error("header declares a {declared}-byte body, found {actual}")]
    BodySizeMismatch { declared: u32, actual: usize },

    #[error(transparent)]
    Codec(#[from] CodecError),
}

// ---------------------------------------------------------------------------
// Header
// ---------------------------------------------------------------------------

/// An account transaction header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    sender: AccountAddress,
    nonce: u64,
    energy: u64,
    body_size: u32,
    expiry: TransactionTime,
}

impl Header {
    pub fn sender(&self) -> &AccountAddress {
        &self.sender
    }

    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    pub fn energy(&self) -> u64 {
        self.energy
    }

    pub fn body_size(&self) -> u32 {
        self.body_size
    }

    pub fn expiry(&self) -> TransactionTime {
        self.expiry
    }

    /// Serializes the header. Always [`HEADER_SIZE`] bytes.
    pub fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(HEADER_SIZE);
        out.put_slice(self.sender.as_bytes());
        out.put_u64(self.nonce);
        out.put_u64(self.energy);
        out.put_u32(self.body_size);
        out.put_u64(self.expiry.seconds());
        out
    }

    /// Parses exactly [`HEADER_SIZE`] bytes.
    pub fn decode(bytes: &[u8]) -> Result<Self, TransactionError> {
        if bytes.len() != HEADER_SIZE {
            return Err(TransactionError::InvalidHeaderLength {
                expected: HEADER_SIZE,
                actual: bytes.len(),
            });
        }
        let mut reader = Reader::new(bytes);
        let header = Self {
            sender: AccountAddress::new(reader.read_array()?),
            nonce: reader.read_u64_be()?,
            energy: reader.read_u64_be()?,
            body_size: reader.read_u32_be()?,
            expiry: TransactionTime::from_seconds(reader.read_u64_be()?),
        };
        reader.finish()?;
        Ok(header)
    }
}

// ---------------------------------------------------------------------------
// HeaderBuilder
// ---------------------------------------------------------------------------

/// Collects header fields and produces an immutable [`Header`].
///
/// ```rust
/// use aurum_sdk::transaction::{AccountAddress, HeaderBuilder, TransactionTime};
///
/// let header = HeaderBuilder::new(AccountAddress::new([1; 32]))
///     .nonce(5)
///     .expiry(TransactionTime::from_seconds(1_622_334_455))
///     .body_size(10)
///     .energy(1000)
///     .finish()
///     .unwrap();
/// assert_eq!(header.serialize().len(), 60);
/// ```
#[derive(Debug, Clone)]
pub struct HeaderBuilder {
    sender: AccountAddress,
    nonce: Option<u64>,
    expiry: Option<TransactionTime>,
    body_size: Option<u32>,
    energy: Option<u64>,
}

impl HeaderBuilder {
    pub fn new(sender: AccountAddress) -> Self {
        Self {
            sender,
            nonce: None,
            expiry: None,
            body_size: None,
            energy: None,
        }
    }

    pub fn nonce(mut self, nonce: u64) -> Self {
        self.nonce = Some(nonce);
        self
    }

    pub fn expiry(mut self, expiry: TransactionTime) -> Self {
        self.expiry = Some(expiry);
        self
    }

    /// Sets the body size directly. Prefer [`finish_for_body`](Self::finish_for_body).
    pub fn body_size(mut self, body_size: u32) -> Self {
        self.body_size = Some(body_size);
        self
    }

    /// Sets the energy directly. Prefer [`finish_for_body`](Self::finish_for_body).
    pub fn energy(mut self, energy: u64) -> Self {
        self.energy = Some(energy);
        self
    }

    /// Builds the header from explicitly set fields.
    pub fn finish(self) -> Result<Header, TransactionError> {
        Ok(Header {
            sender: self.sender,
            nonce: self.nonce.ok_or(TransactionError::MissingHeaderField("nonce"))?,
            energy: self
                .energy
                .ok_or(TransactionError::MissingHeaderField("energy"))?,
            body_size: self
                .body_size
                .ok_or(TransactionError::MissingHeaderField("body_size"))?,
            expiry: self
                .expiry
                .ok_or(TransactionError::MissingHeaderField("expiry"))?,
        })
    }

    /// Fills in body size and energy from the encoded body and the number
    /// of signatures the transaction will carry, then builds the header.
    pub fn finish_for_body(
        self,
        body: &EncodedPayload,
        signature_count: usize,
    ) -> Result<Header, TransactionError> {
        let body_size =
            u32::try_from(body.len()).map_err(|_| TransactionError::BodyTooLarge(body.len()))?;
        let energy = energy_for_body(signature_count as u64, body_size as u64, body.base_energy);
        self.body_size(body_size).energy(energy).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sender() -> AccountAddress {
        let mut bytes = [0x5a; 32];
        bytes[0] = 67;
        bytes[1] = 216;
        bytes[2] = 242;
        bytes[31] = 217;
        AccountAddress::new(bytes)
    }

    fn vector_header() -> Header {
        HeaderBuilder::new(sender())
            .nonce(5)
            .energy(1000)
            .body_size(10)
            .expiry(TransactionTime::from_seconds(1_622_334_455))
            .finish()
            .unwrap()
    }

    #[test]
    fn serialized_header_is_sixty_bytes() {
        assert_eq!(vector_header().serialize().len(), HEADER_SIZE);
    }

    #[test]
    fn header_vector() {
        let mut expected = vec![67, 216, 242];
        expected.extend_from_slice(&[0x5a; 28]);
        expected.push(217);
        expected.extend_from_slice(&[
            0, 0, 0, 0, 0, 0, 0, 5, // nonce
            0, 0, 0, 0, 0, 0, 0x03, 0xe8, // energy
            0, 0, 0, 10, // body size
            0, 0, 0, 0, 96, 178, 219, 247, // expiry
        ]);
        assert_eq!(vector_header().serialize(), expected);
    }

    #[test]
    fn decode_reverses_serialize() {
        let header = vector_header();
        assert_eq!(Header::decode(&header.serialize()).unwrap(), header);
    }

    #[test]
    fn decode_rejects_wrong_length() {
        assert_eq!(
            Header::decode(&[0; 59]),
            Err(TransactionError::InvalidHeaderLength {
                expected: 60,
                actual: 59
            })
        );
    }

    #[test]
    fn finish_requires_every_field() {
        let err = HeaderBuilder::new(sender())
            .nonce(1)
            .expiry(TransactionTime::from_seconds(1))
            .finish()
            .unwrap_err();
        assert_eq!(err, TransactionError::MissingHeaderField("energy"));

        let err = HeaderBuilder::new(sender()).finish().unwrap_err();
        assert_eq!(err, TransactionError::MissingHeaderField("nonce"));
    }

    #[test]
    fn finish_for_body_computes_size_and_energy() {
        let body = EncodedPayload {
            bytes: vec![0; 41],
            base_energy: 300,
        };
        let header = HeaderBuilder::new(sender())
            .nonce(1)
            .expiry(TransactionTime::from_seconds(100))
            .finish_for_body(&body, 2)
            .unwrap();
        assert_eq!(header.body_size(), 41);
        assert_eq!(header.energy(), 2 * 100 + (60 + 41) + 300);
    }
}
