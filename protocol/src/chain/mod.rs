//! # Chain Query Service
//!
//! The signer's only view of the ledger. Four calls, all read-only except
//! `submit`:
//!
//! ```text
//! latest_parameters()       -> ChainParameters
//! latest_tip()              -> ChainTip
//! spendable_outputs(addr)   -> Vec<UnspentOutput>
//! submit(cbor bytes)        -> TransactionId
//! ```
//!
//! [`ChainQuery`] is the seam: the pipeline is generic over it, production
//! uses [`BlockfrostClient`], tests use an in-memory recorder.

pub mod blockfrost;
pub mod error;

use async_trait::async_trait;
use serde::Deserialize;

use crate::transaction::address::Address;
use crate::transaction::types::{Lovelace, TransactionHash, TransactionId, ValueError};

pub use blockfrost::BlockfrostClient;
pub use error::ChainQueryError;

/// Unit name of the base currency in the service's asset lists.
pub const LOVELACE_UNIT: &str = "lovelace";

// ---------------------------------------------------------------------------
// ChainQuery
// ---------------------------------------------------------------------------

#[async_trait]
pub trait ChainQuery: Send + Sync {
    /// Protocol parameters of the current epoch.
    async fn latest_parameters(&self) -> Result<ChainParameters, ChainQueryError>;

    /// The latest block's slot.
    async fn latest_tip(&self) -> Result<ChainTip, ChainQueryError>;

    /// Every unspent output sitting at `address`. An address that never
    /// received funds yields an empty list, not an error.
    async fn spendable_outputs(
        &self,
        address: &Address,
    ) -> Result<Vec<UnspentOutput>, ChainQueryError>;

    /// Broadcasts a finalized, CBOR-encoded transaction.
    async fn submit(&self, signed_tx: &[u8]) -> Result<TransactionId, ChainQueryError>;
}

// ---------------------------------------------------------------------------
// Quantity
// ---------------------------------------------------------------------------

/// A numeric field as the service sends it: sometimes a JSON number,
/// sometimes a decimal string. Both are validated the same way.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Quantity {
    Number(serde_json::Number),
    Text(String),
}

impl Quantity {
    pub fn to_u64(&self) -> Result<u64, ValueError> {
        match self {
            Self::Number(n) => n.as_u64().ok_or_else(|| ValueError::MalformedQuantity {
                input: n.to_string(),
            }),
            Self::Text(s) => s.parse::<Lovelace>().map(Lovelace::as_u64),
        }
    }

    pub fn to_lovelace(&self) -> Result<Lovelace, ValueError> {
        self.to_u64().map(Lovelace::new)
    }
}

impl From<u64> for Quantity {
    fn from(value: u64) -> Self {
        Self::Number(value.into())
    }
}

// ---------------------------------------------------------------------------
// ChainParameters
// ---------------------------------------------------------------------------

/// Protocol parameters as reported by the service, before validation.
#[derive(Debug, Clone, Deserialize)]
pub struct RawProtocolParameters {
    pub min_fee_a: Quantity,
    pub min_fee_b: Quantity,
    pub pool_deposit: Quantity,
    pub key_deposit: Quantity,
    pub max_val_size: Option<Quantity>,
    pub max_tx_size: Quantity,
    #[serde(default)]
    pub coins_per_utxo_size: Option<Quantity>,
    /// Pre-Babbage name of the min-UTXO coefficient, priced per 8-byte word.
    #[serde(default)]
    pub coins_per_utxo_word: Option<Quantity>,
}

/// Validated protocol parameters. Immutable for the rest of the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainParameters {
    /// Linear fee coefficient `a`, lovelace per byte.
    pub min_fee_a: u64,
    /// Linear fee constant `b`.
    pub min_fee_b: Lovelace,
    pub pool_deposit: Lovelace,
    pub key_deposit: Lovelace,
    pub max_value_size: u64,
    pub max_tx_size: u64,
    /// Lovelace per byte of serialized output, for the min-UTXO rule.
    pub coins_per_utxo_byte: Lovelace,
}

impl ChainParameters {
    /// Validates the raw fields. Malformed numeric strings, negative numbers
    /// and a missing min-UTXO coefficient are rejected.
    pub fn from_raw(raw: &RawProtocolParameters) -> Result<Self, ValueError> {
        let coins_per_utxo_byte = match (&raw.coins_per_utxo_size, &raw.coins_per_utxo_word) {
            (Some(per_byte), _) => per_byte.to_lovelace()?,
            (None, Some(per_word)) => Lovelace::new(per_word.to_u64()? / 8),
            (None, None) => {
                return Err(ValueError::MalformedQuantity {
                    input: "coins_per_utxo_size".to_string(),
                })
            }
        };

        Ok(Self {
            min_fee_a: raw.min_fee_a.to_u64()?,
            min_fee_b: raw.min_fee_b.to_lovelace()?,
            pool_deposit: raw.pool_deposit.to_lovelace()?,
            key_deposit: raw.key_deposit.to_lovelace()?,
            max_value_size: match &raw.max_val_size {
                Some(q) => q.to_u64()?,
                None => u64::MAX,
            },
            max_tx_size: raw.max_tx_size.to_u64()?,
            coins_per_utxo_byte,
        })
    }
}

// ---------------------------------------------------------------------------
// ChainTip
// ---------------------------------------------------------------------------

/// The slot of the most recent block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainTip {
    pub slot: u64,
}

// ---------------------------------------------------------------------------
// UnspentOutput
// ---------------------------------------------------------------------------

/// One entry of an output's asset list, as the service reports it.
#[derive(Debug, Clone, Deserialize)]
pub struct AssetAmount {
    pub unit: String,
    pub quantity: Quantity,
}

/// An output as the service reports it, before validation.
#[derive(Debug, Clone, Deserialize)]
pub struct RawUnspentOutput {
    pub tx_hash: String,
    pub output_index: u32,
    pub amount: Vec<AssetAmount>,
}

/// A validated unspent output. Identified by `(tx_hash, output_index)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnspentOutput {
    pub tx_hash: TransactionHash,
    pub output_index: u32,
    pub lovelace: Lovelace,
    /// Whether the output also holds native assets besides lovelace.
    pub has_native_assets: bool,
}

impl UnspentOutput {
    /// An output holding only lovelace.
    pub fn new(tx_hash: TransactionHash, output_index: u32, lovelace: Lovelace) -> Self {
        Self {
            tx_hash,
            output_index,
            lovelace,
            has_native_assets: false,
        }
    }

    pub fn from_raw(raw: &RawUnspentOutput) -> Result<Self, ValueError> {
        let tx_hash: TransactionHash = raw.tx_hash.parse()?;
        let mut lovelace = Lovelace::ZERO;
        let mut has_native_assets = false;
        for asset in &raw.amount {
            let quantity = asset.quantity.to_lovelace()?;
            if asset.unit == LOVELACE_UNIT {
                lovelace = lovelace.checked_add(quantity)?;
            } else if !quantity.is_zero() {
                has_native_assets = true;
            }
        }
        Ok(Self {
            tx_hash,
            output_index: raw.output_index,
            lovelace,
            has_native_assets,
        })
    }
}
