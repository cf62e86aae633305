//! # Signer Configuration & Constants
//!
//! Every magic number the signer relies on lives here, next to the one
//! configuration value built at startup: [`SignerConfig`]. It is constructed
//! once, validated once, and then only ever borrowed by the pipeline.
//!
//! ## File format
//!
//! ```toml
//! network = "preprod"
//! sender_address = "addr_test1..."
//! signing_key = "5820..."          # hex, cbor hex or ed25519_sk1...
//! spending_limit = 50000000        # lovelace, optional
//! metadata = ["This automated transaction is powered by remit"]
//!
//! [blockfrost]
//! project_id = "preprodAbC..."
//! # base_url = "http://localhost:3000/api/v0"   # optional override
//! ```

use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::crypto::keys::PaymentKeypair;
use crate::error::Error;
use crate::transaction::address::{Address, AddressError};
use crate::transaction::error::BuildError;
use crate::transaction::metadata::{self, MetadataError};
use crate::transaction::types::Lovelace;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Slots added to the current tip to form the time-to-live. Bounds how long
/// a signed transaction stays eligible for inclusion.
pub const TTL_WINDOW_SLOTS: u64 = 200;

/// Where the signed transaction is written when not submitting.
pub const DEFAULT_OUT_FILE: &str = "./tx.signed";

/// Configuration file read when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "remit.toml";

/// Default ceiling on a single transfer: 50 ada.
pub const DEFAULT_SPENDING_LIMIT: Lovelace = Lovelace::new(50_000_000);

/// Ledger limit on the UTF-8 length of a text metadatum.
pub const MAX_METADATA_TEXT_BYTES: usize = 64;

/// Fixed per-entry overhead, in bytes, of the min-UTXO rule
/// `coins_per_utxo_byte * (overhead + serialized output size)`.
pub const UTXO_ENTRY_OVERHEAD_BYTES: u64 = 160;

/// Page size for UTXO listings. The service caps pages at 100 entries.
pub const UTXO_PAGE_SIZE: usize = 100;

/// Upper bound on fee/size refinement rounds. Two or three always suffice;
/// hitting this means the fee function is not monotone.
pub const MAX_FEE_ITERATIONS: usize = 8;

/// Blockfrost API roots per network.
pub const BLOCKFROST_MAINNET_URL: &str = "https://cardano-mainnet.blockfrost.io/api/v0";
pub const BLOCKFROST_PREPROD_URL: &str = "https://cardano-preprod.blockfrost.io/api/v0";
pub const BLOCKFROST_PREVIEW_URL: &str = "https://cardano-preview.blockfrost.io/api/v0";

// ---------------------------------------------------------------------------
// Network
// ---------------------------------------------------------------------------

/// The ledger network the signer targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Mainnet,
    Preprod,
    Preview,
}

impl Network {
    pub fn is_mainnet(self) -> bool {
        self == Network::Mainnet
    }

    pub fn blockfrost_url(self) -> &'static str {
        match self {
            Network::Mainnet => BLOCKFROST_MAINNET_URL,
            Network::Preprod => BLOCKFROST_PREPROD_URL,
            Network::Preview => BLOCKFROST_PREVIEW_URL,
        }
    }

    /// Whether an address belongs to this network.
    pub fn accepts(self, address: &Address) -> bool {
        address.is_mainnet() == self.is_mainnet()
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Network::Mainnet => write!(f, "mainnet"),
            Network::Preprod => write!(f, "preprod"),
            Network::Preview => write!(f, "preview"),
        }
    }
}

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Problems with the configuration or with the requested transfer itself.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid {field}: {source}")]
    InvalidAddress {
        field: &'static str,
        #[source]
        source: AddressError,
    },

    #[error("{field} {address} does not belong to {network}")]
    WrongNetwork {
        field: &'static str,
        address: String,
        network: Network,
    },

    #[error("sender address must have a key-based payment credential")]
    ScriptSender,

    #[error("signing key {key_hash} does not control sender address {address}")]
    SenderKeyMismatch { key_hash: String, address: String },

    #[error("blockfrost project_id must not be empty")]
    MissingProjectId,

    #[error(transparent)]
    Metadata(#[from] MetadataError),

    #[error("amount {requested} exceeds spending limit {limit}")]
    SpendingLimitExceeded { requested: Lovelace, limit: Lovelace },

    #[error("amount must be greater than zero")]
    ZeroAmount,

    #[error("cannot build transaction: {0}")]
    Transaction(BuildError),
}

// ---------------------------------------------------------------------------
// SignerConfig
// ---------------------------------------------------------------------------

/// Configuration file contents before validation.
///
/// Deliberately not `Debug`: it holds the secret key as plain text.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfig {
    pub network: Network,
    pub sender_address: String,
    pub signing_key: String,
    #[serde(default)]
    pub spending_limit: Option<u64>,
    #[serde(default)]
    pub metadata: Vec<String>,
    pub blockfrost: RawChainService,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawChainService {
    pub project_id: String,
    #[serde(default)]
    pub base_url: Option<String>,
}

/// Where and how to reach the chain query service.
#[derive(Clone, PartialEq, Eq)]
pub struct ChainServiceConfig {
    pub base_url: String,
    pub project_id: String,
}

impl fmt::Debug for ChainServiceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // The project id is a credential.
        f.debug_struct("ChainServiceConfig")
            .field("base_url", &self.base_url)
            .field("project_id", &"<redacted>")
            .finish()
    }
}

/// Validated, immutable signer configuration.
#[derive(Debug)]
pub struct SignerConfig {
    pub network: Network,
    pub sender_address: Address,
    signing_key: PaymentKeypair,
    pub spending_limit: Lovelace,
    pub metadata: Vec<String>,
    pub chain_service: ChainServiceConfig,
}

impl SignerConfig {
    /// Validates every field against every other field:
    ///
    /// - the key parses (a malformed key is a signing error),
    /// - the sender address parses, is on `network`, and is controlled by the key,
    /// - every metadata line fits a text metadatum,
    /// - the service credential is present.
    pub fn from_raw(raw: RawConfig) -> Result<Self, Error> {
        let signing_key = PaymentKeypair::parse(&raw.signing_key)?;

        let sender_address: Address =
            raw.sender_address
                .trim()
                .parse()
                .map_err(|source| ConfigError::InvalidAddress {
                    field: "sender_address",
                    source,
                })?;
        if !raw.network.accepts(&sender_address) {
            return Err(ConfigError::WrongNetwork {
                field: "sender_address",
                address: sender_address.to_string(),
                network: raw.network,
            }
            .into());
        }
        let owner = sender_address
            .payment_key_hash()
            .ok_or(ConfigError::ScriptSender)?;
        if owner != signing_key.key_hash() {
            return Err(ConfigError::SenderKeyMismatch {
                key_hash: signing_key.key_hash().to_hex(),
                address: sender_address.to_string(),
            }
            .into());
        }

        metadata::validate_lines(&raw.metadata).map_err(ConfigError::from)?;

        let project_id = raw.blockfrost.project_id.trim().to_string();
        if project_id.is_empty() {
            return Err(ConfigError::MissingProjectId.into());
        }
        let base_url = raw
            .blockfrost
            .base_url
            .unwrap_or_else(|| raw.network.blockfrost_url().to_string());

        Ok(Self {
            network: raw.network,
            sender_address,
            signing_key,
            spending_limit: raw
                .spending_limit
                .map(Lovelace::new)
                .unwrap_or(DEFAULT_SPENDING_LIMIT),
            metadata: raw.metadata,
            chain_service: ChainServiceConfig {
                base_url,
                project_id,
            },
        })
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, Error> {
        let raw: RawConfig = toml::from_str(contents).map_err(ConfigError::from)?;
        Self::from_raw(raw)
    }

    /// Reads and validates a TOML configuration file.
    pub fn load(path: &Path) -> Result<Self, Error> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// The sender's key. Borrowed by the signer, never copied.
    pub fn signing_key(&self) -> &PaymentKeypair {
        &self.signing_key
    }
}
