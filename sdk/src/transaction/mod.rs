//! # Transaction Module
//!
//! Encoding and signing of account transactions, from a typed [`Payload`]
//! to the exact bytes the node accepts.
//!
//! ## Architecture
//!
//! ```text
//! types.rs    Account/contract addresses, amounts, module refs, hashes, expiry
//! payload.rs  The four body variants and their big-endian wire layout
//! header.rs   The fixed 60-byte header and HeaderBuilder
//! energy.rs   Energy cost model
//! signing.rs  Credential sets and the multi-key signature block
//! builder.rs  assemble(): body -> header -> signatures -> SignedTransaction
//! ```
//!
//! ## Wire format
//!
//! ```text
//! signature block ‖ header (60 bytes) ‖ body
//! ```
//!
//! The header carries the energy the transaction may spend, and energy is
//! charged on the size of header plus body. Because the header has a fixed
//! size, energy can be computed from the body alone before the header is
//! built. Signatures cover `SHA-256(header ‖ body)`, so they come last.

pub mod builder;
pub mod energy;
pub mod header;
pub mod payload;
pub mod signing;
pub mod types;

pub use builder::{assemble, AssemblyError, SignedTransaction};
pub use header::{Header, HeaderBuilder, TransactionError};
pub use payload::{EncodedPayload, Parameter, Payload, PayloadError};
pub use signing::{
    signature_count, single_key, transaction_digest, CredentialIndex, CredentialSet, KeyIndex,
    SignatureBlock, SigningError,
};
pub use types::{
    AccountAddress, AddressError, Amount, ContractAddress, HexIdError, ModuleRef, TransactionHash,
    TransactionTime,
};
