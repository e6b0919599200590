//! # Account Keys
//!
//! An account key pair is held the way credential files store it: a hex
//! encoded 32-byte ed25519 secret scalar and a hex encoded 32-byte public
//! (verify) key. Nothing is decoded until a signature is actually needed,
//! so a corrupt key only fails the transaction that tries to use it.
//!
//! Key bytes are never logged, and `Debug` output never shows the secret.

use ed25519_dalek::{SigningKey, VerifyingKey, KEYPAIR_LENGTH};
use rand::rngs::OsRng;
use std::fmt;
use thiserror::Error;

use crate::config::KEY_LENGTH;

/// Errors raised while decoding key material.
///
/// These never include key bytes.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeyError {
    #[error("sign key is not valid hex")]
    InvalidSignKeyHex,

    #[error("verify key is not valid hex")]
    InvalidVerifyKeyHex,

    #[error("{which} key must be {expected} bytes, got {actual}")]
    InvalidLength {
        which: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("verify key is not a valid ed25519 point")]
    InvalidVerifyKey,

    #[error("sign key does not match verify key")]
    KeypairMismatch,
}

/// One signing key of an account credential.
#[derive(Clone, PartialEq, Eq)]
pub struct KeyPair {
    sign_key: String,
    verify_key: String,
}

impl KeyPair {
    /// Wraps hex encoded key material. Validation is deferred to
    /// [`signing_key`](Self::signing_key).
    pub fn new(sign_key_hex: impl Into<String>, verify_key_hex: impl Into<String>) -> Self {
        Self {
            sign_key: sign_key_hex.into(),
            verify_key: verify_key_hex.into(),
        }
    }

    /// Generates a fresh key pair from the OS RNG.
    pub fn generate() -> Self {
        Self::from_signing_key(&SigningKey::generate(&mut OsRng))
    }

    pub fn from_signing_key(key: &SigningKey) -> Self {
        Self {
            sign_key: hex::encode(key.to_bytes()),
            verify_key: hex::encode(key.verifying_key().to_bytes()),
        }
    }

    pub fn verify_key_hex(&self) -> &str {
        &self.verify_key
    }

    /// Decodes the verify key.
    pub fn verifying_key(&self) -> Result<VerifyingKey, KeyError> {
        let bytes = decode_key(&self.verify_key, "verify", KeyError::InvalidVerifyKeyHex)?;
        VerifyingKey::from_bytes(&bytes).map_err(|_| KeyError::InvalidVerifyKey)
    }

    /// Decodes the pair into an ed25519 signing key.
    ///
    /// The key material is the 32-byte secret scalar followed by the 32-byte
    /// public key; the two halves must belong together.
    pub fn signing_key(&self) -> Result<SigningKey, KeyError> {
        let secret = decode_key(&self.sign_key, "sign", KeyError::InvalidSignKeyHex)?;
        let public = decode_key(&self.verify_key, "verify", KeyError::InvalidVerifyKeyHex)?;

        let mut keypair = [0u8; KEYPAIR_LENGTH];
        keypair[..KEY_LENGTH].copy_from_slice(&secret);
        keypair[KEY_LENGTH..].copy_from_slice(&public);

        SigningKey::from_keypair_bytes(&keypair).map_err(|_| KeyError::KeypairMismatch)
    }
}

fn decode_key(
    hex_str: &str,
    which: &'static str,
    hex_error: KeyError,
) -> Result<[u8; KEY_LENGTH], KeyError> {
    let bytes = hex::decode(hex_str).map_err(|_| hex_error)?;
    bytes
        .as_slice()
        .try_into()
        .map_err(|_| KeyError::InvalidLength {
            which,
            expected: KEY_LENGTH,
            actual: bytes.len(),
        })
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KeyPair(verify={})", self.verify_key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ed25519_dalek::Signer;

    // RFC 8032 section 7.1, test 1.
    const RFC_SECRET: &str = "9d61b19deffd5a60ba844af492ec2cc44449c5697b326919703bac031cae7f60";
    const RFC_PUBLIC: &str = "d75a980182b10ab7d54bfed3c964073a0ee172f3daa62325af021a68f707511a";

    #[test]
    fn decodes_rfc8032_pair() {
        let kp = KeyPair::new(RFC_SECRET, RFC_PUBLIC);
        let signing = kp.signing_key().unwrap();
        assert_eq!(hex::encode(signing.verifying_key().to_bytes()), RFC_PUBLIC);
        // Empty-message signature from the RFC.
        assert_eq!(
            hex::encode(signing.sign(b"").to_bytes()),
            "e5564300c360ac729086e2cc806e828a84877f1eb8e5d974d873e065224901555fb8821590a33bacc61e39701cf9b46bd25bf5f0595bbe24655141438e7a100b"
        );
    }

    #[test]
    fn generated_pair_roundtrips() {
        let kp = KeyPair::generate();
        let signing = kp.signing_key().unwrap();
        assert_eq!(
            hex::encode(signing.verifying_key().to_bytes()),
            kp.verify_key_hex()
        );
        assert!(kp.verifying_key().is_ok());
    }

    #[test]
    fn non_hex_sign_key_is_rejected() {
        let kp = KeyPair::new("zz", RFC_PUBLIC);
        assert_eq!(kp.signing_key().unwrap_err(), KeyError::InvalidSignKeyHex);
    }

    #[test]
    fn non_hex_verify_key_is_rejected() {
        let kp = KeyPair::new(RFC_SECRET, "not hex at all");
        assert_eq!(kp.signing_key().unwrap_err(), KeyError::InvalidVerifyKeyHex);
    }

    #[test]
    fn short_key_is_rejected() {
        let kp = KeyPair::new("abcd", RFC_PUBLIC);
        assert_eq!(
            kp.signing_key().unwrap_err(),
            KeyError::InvalidLength {
                which: "sign",
                expected: 32,
                actual: 2
            }
        );
    }

    #[test]
    fn mismatched_halves_are_rejected() {
        let other = KeyPair::generate();
        let kp = KeyPair::new(RFC_SECRET, other.verify_key_hex());
        assert_eq!(kp.signing_key().unwrap_err(), KeyError::KeypairMismatch);
    }

    #[test]
    fn debug_does_not_leak_secret() {
        let kp = KeyPair::new(RFC_SECRET, RFC_PUBLIC);
        let debug = format!("{:?}", kp);
        assert!(!debug.contains(RFC_SECRET));
        assert!(debug.contains(RFC_PUBLIC));
    }
}
