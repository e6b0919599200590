//! Core value types shared by transaction bodies and headers.
//!
//! These are small `Copy` newtypes around the raw wire representation. Each
//! one knows its own human-readable form (base58check for accounts, hex for
//! module references and hashes) and its raw codec encoding.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::codec::{CodecError, Decode, Encode, Reader};
use crate::config::{ACCOUNT_ADDRESS_LENGTH, ACCOUNT_ADDRESS_VERSION};
use crate::crypto::hash::double_sha256;

/// Length of the base58check checksum suffix.
const CHECKSUM_LENGTH: usize = 4;

// ---------------------------------------------------------------------------
// AccountAddress
// ---------------------------------------------------------------------------

/// Errors while parsing an account address from its base58check form.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AddressError {
    #[error("address is empty")]
    Empty,

    #[error("address is not valid base58")]
    InvalidBase58,

    #[error("decoded address must be {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("unexpected address version byte {0}")]
    InvalidVersion(u8),

    #[error("address checksum mismatch")]
    ChecksumMismatch,
}

/// A 32-byte account address.
///
/// On the wire this is the raw 32 bytes. For humans it is base58check:
/// `base58(version ‖ bytes ‖ double_sha256(version ‖ bytes)[..4])`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AccountAddress([u8; ACCOUNT_ADDRESS_LENGTH]);

impl AccountAddress {
    pub const fn new(bytes: [u8; ACCOUNT_ADDRESS_LENGTH]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; ACCOUNT_ADDRESS_LENGTH] {
        &self.0
    }

    /// Encodes the address in base58check form.
    pub fn to_base58check(&self) -> String {
        let mut buf = Vec::with_capacity(1 + ACCOUNT_ADDRESS_LENGTH + CHECKSUM_LENGTH);
        buf.push(ACCOUNT_ADDRESS_VERSION);
        buf.extend_from_slice(&self.0);
        let checksum = double_sha256(&buf);
        buf.extend_from_slice(&checksum[..CHECKSUM_LENGTH]);
        bs58::encode(buf).into_string()
    }

    /// Parses and checks a base58check address.
    pub fn from_base58check(s: &str) -> Result<Self, AddressError> {
        if s.is_empty() {
            return Err(AddressError::Empty);
        }
        let raw = bs58::decode(s)
            .into_vec()
            .map_err(|_| AddressError::InvalidBase58)?;

        let expected = 1 + ACCOUNT_ADDRESS_LENGTH + CHECKSUM_LENGTH;
        if raw.len() != expected {
            return Err(AddressError::InvalidLength {
                expected,
                actual: raw.len(),
            });
        }
        if raw[0] != ACCOUNT_ADDRESS_VERSION {
            return Err(AddressError::InvalidVersion(raw[0]));
        }

        let (body, checksum) = raw.split_at(1 + ACCOUNT_ADDRESS_LENGTH);
        if double_sha256(body)[..CHECKSUM_LENGTH] != *checksum {
            return Err(AddressError::ChecksumMismatch);
        }

        let mut bytes = [0u8; ACCOUNT_ADDRESS_LENGTH];
        bytes.copy_from_slice(&body[1..]);
        Ok(Self(bytes))
    }
}

impl fmt::Display for AccountAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_base58check())
    }
}

impl fmt::Debug for AccountAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccountAddress({})", self)
    }
}

impl FromStr for AccountAddress {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_base58check(s)
    }
}

impl From<[u8; ACCOUNT_ADDRESS_LENGTH]> for AccountAddress {
    fn from(bytes: [u8; ACCOUNT_ADDRESS_LENGTH]) -> Self {
        Self(bytes)
    }
}

impl Serialize for AccountAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for AccountAddress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// Fixed-size address leaf: raw bytes, no length prefix.
impl Encode for AccountAddress {
    fn encode_to(&self, out: &mut Vec<u8>) -> Result<(), CodecError> {
        out.extend_from_slice(&self.0);
        Ok(())
    }

    fn encoded_len(&self) -> Result<usize, CodecError> {
        Ok(ACCOUNT_ADDRESS_LENGTH)
    }
}

impl Decode for AccountAddress {
    fn decode_from(reader: &mut Reader<'_>) -> Result<Self, CodecError> {
        Ok(Self(reader.read_array()?))
    }
}

// ---------------------------------------------------------------------------
// Amount
// ---------------------------------------------------------------------------

/// An amount of the native token in its smallest unit.
///
/// Always an integer. There is no floating point anywhere near money.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Amount(u64);

impl Amount {
    pub const ZERO: Amount = Amount(0);

    pub const fn new(micro_units: u64) -> Self {
        Self(micro_units)
    }

    pub const fn micro_units(self) -> u64 {
        self.0
    }

    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for Amount {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

// ---------------------------------------------------------------------------
// ContractAddress
// ---------------------------------------------------------------------------

/// A smart contract instance, addressed by `(index, subindex)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContractAddress {
    pub index: u64,
    pub subindex: u64,
}

impl ContractAddress {
    pub const fn new(index: u64, subindex: u64) -> Self {
        Self { index, subindex }
    }
}

impl fmt::Display for ContractAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{},{}>", self.index, self.subindex)
    }
}

// ---------------------------------------------------------------------------
// 32-byte hex identifiers
// ---------------------------------------------------------------------------

/// Errors while parsing a hex encoded 32-byte identifier.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HexIdError {
    #[error("identifier is not valid hex")]
    InvalidHex,

    #[error("identifier must be 32 bytes, got {0}")]
    InvalidLength(usize),
}

macro_rules! hex_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name([u8; 32]);

        impl $name {
            pub const fn new(bytes: [u8; 32]) -> Self {
                Self(bytes)
            }

            pub fn as_bytes(&self) -> &[u8; 32] {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&hex::encode(self.0))
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self)
            }
        }

        impl FromStr for $name {
            type Err = HexIdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let bytes = hex::decode(s).map_err(|_| HexIdError::InvalidHex)?;
                let len = bytes.len();
                let arr: [u8; 32] = bytes
                    .try_into()
                    .map_err(|_| HexIdError::InvalidLength(len))?;
                Ok(Self(arr))
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.collect_str(self)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                s.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

hex_id! {
    /// Reference to a deployed wasm module: the hash of its source.
    ModuleRef
}

hex_id! {
    /// Hash of a submitted transaction, used to look up its status.
    TransactionHash
}

// ---------------------------------------------------------------------------
// TransactionTime
// ---------------------------------------------------------------------------

/// Transaction expiry, in whole seconds since the unix epoch.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct TransactionTime(u64);

impl TransactionTime {
    pub const fn from_seconds(seconds: u64) -> Self {
        Self(seconds)
    }

    pub const fn seconds(self) -> u64 {
        self.0
    }

    /// Truncates to whole seconds. Times before the epoch clamp to zero.
    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(u64::try_from(dt.timestamp()).unwrap_or(0))
    }

    /// `now + window`, the default expiry for a fresh transaction.
    pub fn expiring_in(window: std::time::Duration) -> Self {
        let now = Self::from_datetime(Utc::now());
        Self(now.0.saturating_add(window.as_secs()))
    }
}

impl fmt::Display for TransactionTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
