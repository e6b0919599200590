//! # Cryptographic Primitives
//!
//! Thin wrappers over audited crates: `sha2` for digests and
//! `ed25519-dalek` for signatures. The transaction pipeline only ever signs a
//! precomputed SHA-256 digest, so that is all this module offers.

pub mod hash;
pub mod keys;

pub use hash::{double_sha256, sha256, sha256_concat};
pub use keys::{KeyError, KeyPair};
