//! # Hashing Utilities
//!
//! SHA-256 is the only hash the chain asks of us: it is the transaction
//! digest that gets signed, the transaction hash callers poll with, and
//! (doubled) the checksum on base58check account addresses.

use sha2::{Digest, Sha256};

/// Compute the SHA-256 hash of the input data.
///
/// # Example
///
/// ```
/// use aurum_sdk::crypto::sha256;
///
/// let hash = sha256(b"aurum");
/// assert_eq!(hash.len(), 32);
/// ```
pub fn sha256(data: &[u8]) -> [u8; 32] {
    sha256_concat(&[data])
}

/// SHA-256 over several slices as if they were one contiguous buffer.
///
/// Saves concatenating header and body into a scratch `Vec` just to hash it.
pub fn sha256_concat(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().into()
}

/// Compute the double-SHA-256 hash: `SHA-256(SHA-256(data))`.
///
/// Used for the 4-byte checksum of base58check addresses.
pub fn double_sha256(data: &[u8]) -> [u8; 32] {
    sha256(&sha256(data))
}
