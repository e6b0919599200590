// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Aurum SDK — Transaction Encoding and Signing
//!
//! Client-side library for building account transactions byte for byte the
//! way the Aurum node expects them, signing them with every key an account
//! requires, and handing them to a node.
//!
//! The node does not forgive: one byte out of place, one wrong endianness,
//! one energy unit short, and the transaction is rejected. Everything in
//! here exists to make the bytes right.
//!
//! ## Architecture
//!
//! - **codec** — Schema-driven binary codec for nested values (contract
//!   parameters, records, maps, optional fields, custom leaves).
//! - **transaction** — Body variants, the 60-byte header, the energy model,
//!   multi-credential signing and offline assembly.
//! - **submit** — The async pipeline: validate, fetch nonce, assemble,
//!   submit, await outcome. The node itself sits behind a trait.
//! - **crypto** — SHA-256 and ed25519 key handling. Don't roll your own.
//! - **config** — Wire constants and the client's runtime settings.
//! - **logging** — Optional `tracing` subscriber setup.
//!
//! ## Quick look
//!
//! ```rust
//! use aurum_sdk::crypto::KeyPair;
//! use aurum_sdk::transaction::{
//!     assemble, single_key, AccountAddress, Amount, Payload, TransactionTime,
//! };
//!
//! let keys = single_key(KeyPair::generate());
//! let payload = Payload::transfer(AccountAddress::new([2; 32]), Amount::new(1_000));
//!
//! let tx = assemble(
//!     AccountAddress::new([1; 32]),
//!     1,
//!     TransactionTime::from_seconds(1_700_000_000),
//!     &payload,
//!     &keys,
//! )
//! .unwrap();
//!
//! // One signature, 60-byte header, 41-byte transfer body.
//! assert_eq!(tx.header().energy(), 100 + 60 + 41 + 300);
//! ```

pub mod codec;
pub mod config;
pub mod crypto;
pub mod logging;
pub mod submit;
pub mod transaction;

pub use config::ClientConfig;
pub use submit::{NodeClient, SubmissionResult, SubmitError, Submitter, TransactionRequest};
