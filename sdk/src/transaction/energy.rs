//! Energy cost model.
//!
//! ```text
//! energy = ENERGY_PER_SIGNATURE * signatures
//!        + ENERGY_PER_BYTE      * (HEADER_SIZE + body_size)
//!        + base energy of the body
//! ```
//!
//! The node rejects a transaction whose declared energy is below this, so
//! every constant here must match the chain exactly.

use crate::config::HEADER_SIZE;

/// Charged once per signature in the signature block.
pub const ENERGY_PER_SIGNATURE: u64 = 100;

/// Charged per byte of header plus body.
pub const ENERGY_PER_BYTE: u64 = 1;

/// Module deployment costs one unit per this many bytes of wasm.
pub const DEPLOY_BYTES_PER_ENERGY: u64 = 10;

/// Base cost of initializing or updating a contract.
pub const CONTRACT_CALL_BASE_ENERGY: u64 = 10_000;

/// Base cost of a plain transfer.
pub const SIMPLE_TRANSFER_BASE_ENERGY: u64 = 300;

/// Energy for a transaction with `signature_count` signatures whose header
/// and body together serialize to `total_size` bytes.
pub fn energy(signature_count: u64, total_size: u64, base_energy: u64) -> u64 {
    ENERGY_PER_SIGNATURE
        .saturating_mul(signature_count)
        .saturating_add(ENERGY_PER_BYTE.saturating_mul(total_size))
        .saturating_add(base_energy)
}

/// [`energy`] with the total size derived from the body size.
pub fn energy_for_body(signature_count: u64, body_size: u64, base_energy: u64) -> u64 {
    energy(
        signature_count,
        (HEADER_SIZE as u64).saturating_add(body_size),
        base_energy,
    )
}
