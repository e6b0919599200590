//! Multi-credential transaction signing.
//!
//! An account is controlled by one or more credentials, each holding one or
//! more keys. Every key signs the same digest, `SHA-256(header ‖ body)`, and
//! the signatures are laid out in a block ahead of the header:
//!
//! ```text
//! credential count u8
//! for each credential (ascending index):
//!     credential index u8 ‖ key count u8
//!     for each key (ascending index):
//!         key index u8 ‖ signature length u16 BE (64) ‖ signature [64]
//! ```
//!
//! Signing is all or nothing: if any key fails to decode, no block is
//! produced.

use std::collections::BTreeMap;

use bytes::BufMut;
use ed25519_dalek::{Signature, Signer};
use thiserror::Error;

use crate::codec::{CodecError, Reader};
use crate::config::SIGNATURE_LENGTH;
use crate::crypto::hash::sha256_concat;
use crate::crypto::keys::{KeyError, KeyPair};

pub type CredentialIndex = u8;
pub type KeyIndex = u8;

/// Keys grouped by credential. `BTreeMap` iteration gives the ascending
/// index order the wire layout needs.
pub type CredentialSet = BTreeMap<CredentialIndex, BTreeMap<KeyIndex, KeyPair>>;

/// Signing, decoding, and verification errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SigningError {
    #[error("key {key} of credential {credential}: {source}")]
    Key {
        credential: CredentialIndex,
        key: KeyIndex,
        #[source]
        source: KeyError,
    },

    #[error("credential set is empty")]
    EmptyCredentials,

    #[error("credential {0} has no keys")]
    EmptyCredential(CredentialIndex),

    #[error("{0} credentials exceed the 255 a block can hold")]
    TooManyCredentials(usize),

    #[error("credential {credential} has {count} keys, more than the 255 a block can hold")]
    TooManyKeys {
        credential: CredentialIndex,
        count: usize,
    },

    #[error("signature length must be 64, got {0}")]
    InvalidSignatureLength(u16),

    #[error("duplicate index {0} in signature block")]
    DuplicateIndex(u8),

    #[error("no key for signature {key} of credential {credential}")]
    MissingKey {
        credential: CredentialIndex,
        key: KeyIndex,
    },

    #[error("signature {key} of credential {credential} does not verify")]
    VerificationFailed {
        credential: CredentialIndex,
        key: KeyIndex,
    },

    #[error("malformed signature block: {0}")]
    Malformed(#[from] CodecError),
}

/// Total number of keys across every credential. This is the number of
/// signatures the transaction carries and pays for.
pub fn signature_count(credentials: &CredentialSet) -> usize {
    credentials.values().map(BTreeMap::len).sum()
}

/// A credential set with a single key at credential 0, key 0.
pub fn single_key(keypair: KeyPair) -> CredentialSet {
    BTreeMap::from([(0, BTreeMap::from([(0, keypair)]))])
}

/// The digest every key signs: `SHA-256(header ‖ body)`.
pub fn transaction_digest(header: &[u8], body: &[u8]) -> [u8; 32] {
    sha256_concat(&[header, body])
}

/// Checks that a credential set can be signed with, decoding every key.
pub fn check_credentials(credentials: &CredentialSet) -> Result<(), SigningError> {
    if credentials.is_empty() {
        return Err(SigningError::EmptyCredentials);
    }
    if credentials.len() > u8::MAX as usize {
        return Err(SigningError::TooManyCredentials(credentials.len()));
    }
    for (&credential, keys) in credentials {
        if keys.is_empty() {
            return Err(SigningError::EmptyCredential(credential));
        }
        if keys.len() > u8::MAX as usize {
            return Err(SigningError::TooManyKeys {
                credential,
                count: keys.len(),
            });
        }
        for (&key, pair) in keys {
            pair.signing_key()
                .map_err(|source| SigningError::Key {
                    credential,
                    key,
                    source,
                })?;
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// SignatureBlock
// ---------------------------------------------------------------------------

/// The signatures of a transaction, grouped by credential and key index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureBlock {
    signatures: BTreeMap<CredentialIndex, BTreeMap<KeyIndex, Signature>>,
}

impl SignatureBlock {
    /// Signs `SHA-256(header ‖ body)` with every key in the set.
    pub fn sign(
        header: &[u8],
        body: &[u8],
        credentials: &CredentialSet,
    ) -> Result<Self, SigningError> {
        check_credentials(credentials)?;
        let digest = transaction_digest(header, body);

        let mut signatures = BTreeMap::new();
        for (&credential, keys) in credentials {
            let mut signed = BTreeMap::new();
            for (&key, pair) in keys {
                let signing_key = pair.signing_key().map_err(|source| SigningError::Key {
                    credential,
                    key,
                    source,
                })?;
                signed.insert(key, signing_key.sign(&digest));
            }
            signatures.insert(credential, signed);
        }
        Ok(Self { signatures })
    }

    pub fn signature_count(&self) -> usize {
        self.signatures.values().map(BTreeMap::len).sum()
    }

    pub fn get(&self, credential: CredentialIndex, key: KeyIndex) -> Option<&Signature> {
        self.signatures.get(&credential)?.get(&key)
    }

    /// Serialized length of the block.
    pub fn encoded_len(&self) -> usize {
        1 + self
            .signatures
            .values()
            .map(|keys| 2 + keys.len() * (1 + 2 + SIGNATURE_LENGTH))
            .sum::<usize>()
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.encoded_len());
        // Counts fit in a u8: construction goes through check_credentials or decode.
        out.put_u8(self.signatures.len() as u8);
        for (&credential, keys) in &self.signatures {
            out.put_u8(credential);
            out.put_u8(keys.len() as u8);
            for (&key, signature) in keys {
                out.put_u8(key);
                out.put_u16(SIGNATURE_LENGTH as u16);
                out.put_slice(&signature.to_bytes());
            }
        }
        out
    }

    /// Reads a block from the front of `reader`.
    pub fn read(reader: &mut Reader<'_>) -> Result<Self, SigningError> {
        let mut signatures = BTreeMap::new();
        let credential_count = reader.read_u8()?;
        for _ in 0..credential_count {
            let credential = reader.read_u8()?;
            let key_count = reader.read_u8()?;
            let mut keys = BTreeMap::new();
            for _ in 0..key_count {
                let key = reader.read_u8()?;
                let len = reader.read_u16_be()?;
                if len as usize != SIGNATURE_LENGTH {
                    return Err(SigningError::InvalidSignatureLength(len));
                }
                let bytes: [u8; SIGNATURE_LENGTH] = reader.read_array()?;
                if keys.insert(key, Signature::from_bytes(&bytes)).is_some() {
                    return Err(SigningError::DuplicateIndex(key));
                }
            }
            if signatures.insert(credential, keys).is_some() {
                return Err(SigningError::DuplicateIndex(credential));
            }
        }
        Ok(Self { signatures })
    }

    /// Parses a block that makes up the whole of `bytes`.
    pub fn decode(bytes: &[u8]) -> Result<Self, SigningError> {
        let mut reader = Reader::new(bytes);
        let block = Self::read(&mut reader)?;
        reader.finish()?;
        Ok(block)
    }

    /// Checks every signature in the block against the matching verify key.
    pub fn verify(
        &self,
        digest: &[u8; 32],
        credentials: &CredentialSet,
    ) -> Result<(), SigningError> {
        for (&credential, keys) in &self.signatures {
            for (&key, signature) in keys {
                let pair = credentials
                    .get(&credential)
                    .and_then(|keys| keys.get(&key))
                    .ok_or(SigningError::MissingKey { credential, key })?;
                let verifying_key = pair.verifying_key().map_err(|source| SigningError::Key {
                    credential,
                    key,
                    source,
                })?;
                verifying_key
                    .verify_strict(digest, signature)
                    .map_err(|_| SigningError::VerificationFailed { credential, key })?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ed25519_dalek::SigningKey;

    fn fixed_key(seed: u8) -> KeyPair {
        KeyPair::from_signing_key(&SigningKey::from_bytes(&[seed; 32]))
    }

    fn two_credentials() -> CredentialSet {
        BTreeMap::from([
            (0, BTreeMap::from([(0, fixed_key(1)), (1, fixed_key(2))])),
            (3, BTreeMap::from([(0, fixed_key(3))])),
        ])
    }

    #[test]
    fn signature_count_sums_keys() {
        assert_eq!(signature_count(&two_credentials()), 3);
        assert_eq!(signature_count(&single_key(fixed_key(1))), 1);
    }

    #[test]
    fn block_layout() {
        let block = SignatureBlock::sign(b"header", b"body", &two_credentials()).unwrap();
        let bytes = block.to_bytes();
        assert_eq!(bytes.len(), 1 + (2 + 2 * 67) + (2 + 67));
        assert_eq!(bytes.len(), block.encoded_len());

        assert_eq!(bytes[0], 2);
        // Credential 0, two keys, key 0 with a 64-byte signature.
        assert_eq!(&bytes[1..6], &[0, 2, 0, 0, 64]);
        // Key 1 of credential 0 follows the first signature.
        assert_eq!(&bytes[70..73], &[1, 0, 64]);
        // Credential 3, one key.
        assert_eq!(&bytes[137..142], &[3, 1, 0, 0, 64]);
    }

    #[test]
    fn transfer_signature_vector() {
        use crate::transaction::{AccountAddress, Amount, HeaderBuilder, Payload, TransactionTime};

        // RFC 8032 section 7.1, test 1 key pair.
        let keys = single_key(KeyPair::new(
            "9d61b19deffd5a60ba844af492ec2cc44449c5697b326919703bac031cae7f60",
            "d75a980182b10ab7d54bfed3c964073a0ee172f3daa62325af021a68f707511a",
        ));

        let mut sender = [0x5a; 32];
        sender[..3].copy_from_slice(&[67, 216, 242]);
        sender[31] = 217;
        let body = Payload::transfer(AccountAddress::new([0x22; 32]), Amount::ZERO)
            .serialize()
            .unwrap();
        let header = HeaderBuilder::new(AccountAddress::new(sender))
            .nonce(5)
            .energy(501)
            .body_size(41)
            .expiry(TransactionTime::from_seconds(1_622_334_455))
            .finish()
            .unwrap()
            .serialize();

        assert_eq!(
            hex::encode(transaction_digest(&header, &body)),
            "d8b70eead0758978d12cb0c88ba1da9df21fe88d470ab95cb0d8600ee28b3231"
        );

        let block = SignatureBlock::sign(&header, &body, &keys).unwrap().to_bytes();
        assert_eq!(block.len(), 70);
        assert_eq!(&block[..6], &[1, 0, 1, 0, 0, 64]);
        assert_eq!(
            hex::encode(&block[6..]),
            "bca2eb756626abd2a3fb54c59193543c2ecfbb7ef6e26a653539720c76459118\
             15d94e8daca79b073e3d3966e047a460aeda5da0548e8389dc82a83445833106"
        );
    }

    #[test]
    fn fixed_key_signs_deterministically() {
        let creds = single_key(fixed_key(7));
        let a = SignatureBlock::sign(b"h", b"b", &creds).unwrap().to_bytes();
        let b = SignatureBlock::sign(b"h", b"b", &creds).unwrap().to_bytes();
        assert_eq!(a, b);

        let other = SignatureBlock::sign(b"h", b"B", &creds).unwrap().to_bytes();
        assert_ne!(a, other);
    }

    #[test]
    fn signatures_verify_against_digest() {
        let creds = two_credentials();
        let block = SignatureBlock::sign(b"header", b"body", &creds).unwrap();
        let digest = transaction_digest(b"header", b"body");
        block.verify(&digest, &creds).unwrap();

        let wrong = transaction_digest(b"header", b"tampered");
        assert_eq!(
            block.verify(&wrong, &creds),
            Err(SigningError::VerificationFailed {
                credential: 0,
                key: 0
            })
        );
    }

    #[test]
    fn verify_reports_missing_key() {
        let block = SignatureBlock::sign(b"h", b"b", &two_credentials()).unwrap();
        let digest = transaction_digest(b"h", b"b");
        assert_eq!(
            block.verify(&digest, &single_key(fixed_key(1))),
            Err(SigningError::MissingKey {
                credential: 0,
                key: 1
            })
        );
    }

    #[test]
    fn decode_reverses_to_bytes() {
        let block = SignatureBlock::sign(b"h", b"b", &two_credentials()).unwrap();
        assert_eq!(SignatureBlock::decode(&block.to_bytes()).unwrap(), block);
    }

    #[test]
    fn decode_rejects_bad_signature_length() {
        let mut bytes = SignatureBlock::sign(b"h", b"b", &single_key(fixed_key(1)))
            .unwrap()
            .to_bytes();
        bytes[5] = 63;
        assert_eq!(
            SignatureBlock::decode(&bytes),
            Err(SigningError::InvalidSignatureLength(63))
        );
    }

    #[test]
    fn decode_rejects_truncated_block() {
        let bytes = SignatureBlock::sign(b"h", b"b", &single_key(fixed_key(1)))
            .unwrap()
            .to_bytes();
        assert!(matches!(
            SignatureBlock::decode(&bytes[..40]),
            Err(SigningError::Malformed(CodecError::InsufficientBytes { .. }))
        ));
    }

    #[test]
    fn empty_sets_are_rejected() {
        assert_eq!(
            SignatureBlock::sign(b"h", b"b", &CredentialSet::new()),
            Err(SigningError::EmptyCredentials)
        );
        let empty_credential = BTreeMap::from([(2, BTreeMap::new())]);
        assert_eq!(
            SignatureBlock::sign(b"h", b"b", &empty_credential),
            Err(SigningError::EmptyCredential(2))
        );
    }

    #[test]
    fn one_bad_key_aborts_the_whole_block() {
        let mut creds = two_credentials();
        creds
            .get_mut(&3)
            .unwrap()
            .insert(1, KeyPair::new("not hex", fixed_key(9).verify_key_hex()));
        assert_eq!(
            SignatureBlock::sign(b"h", b"b", &creds),
            Err(SigningError::Key {
                credential: 3,
                key: 1,
                source: KeyError::InvalidSignKeyHex
            })
        );
    }
}
