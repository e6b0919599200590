//! # Client Configuration & Wire Constants
//!
//! Every fixed number the transaction pipeline relies on lives here, next to
//! the small runtime configuration a client can override. Energy prices are
//! the one exception: they belong to the cost model in
//! [`crate::transaction::energy`] and nowhere else.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Network
// ---------------------------------------------------------------------------

/// Network id used when a request does not name one.
pub const DEFAULT_NETWORK_ID: u32 = 100;

/// How far in the future a transaction expires when the caller does not set
/// an expiry explicitly.
pub const DEFAULT_EXPIRY_WINDOW: Duration = Duration::from_secs(10 * 60);

// ---------------------------------------------------------------------------
// Wire layout
// ---------------------------------------------------------------------------

/// Serialized header size: sender 32 + nonce 8 + energy 8 + body size 4 + expiry 8.
pub const HEADER_SIZE: usize = 60;

/// Account addresses are 32 raw bytes on the wire.
pub const ACCOUNT_ADDRESS_LENGTH: usize = 32;

/// Version byte prepended to an account address before base58check encoding.
pub const ACCOUNT_ADDRESS_VERSION: u8 = 1;

/// Ed25519 signatures are always 64 bytes.
pub const SIGNATURE_LENGTH: usize = 64;

/// Ed25519 secret scalars and public keys are both 32 bytes.
pub const KEY_LENGTH: usize = 32;

/// Block item kind for an account transaction. Prefixed to the encoded
/// transaction when computing its hash.
pub const BLOCK_ITEM_KIND_ACCOUNT_TRANSACTION: u8 = 0;

// ---------------------------------------------------------------------------
// ClientConfig
// ---------------------------------------------------------------------------

/// Errors while loading a [`ClientConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid client config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Runtime settings for the submission pipeline.
///
/// Every field has a default, so an empty JSON object is a valid config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Network id sent alongside each transaction.
    pub network_id: u32,
    /// Default expiry window in seconds.
    pub expiry_window_secs: u64,
    /// Deadline for each node call, in milliseconds. `None` waits as long as
    /// the collaborator does.
    pub rpc_timeout_ms: Option<u64>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            network_id: DEFAULT_NETWORK_ID,
            expiry_window_secs: DEFAULT_EXPIRY_WINDOW.as_secs(),
            rpc_timeout_ms: None,
        }
    }
}

impl ClientConfig {
    /// Parses a config from JSON text.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and parses a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    pub fn expiry_window(&self) -> Duration {
        Duration::from_secs(self.expiry_window_secs)
    }

    pub fn rpc_timeout(&self) -> Option<Duration> {
        self.rpc_timeout_ms.map(Duration::from_millis)
    }

    pub fn with_network_id(mut self, network_id: u32) -> Self {
        self.network_id = network_id;
        self
    }

    pub fn with_rpc_timeout(mut self, timeout: Duration) -> Self {
        self.rpc_timeout_ms = Some(u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX));
        self
    }
}
