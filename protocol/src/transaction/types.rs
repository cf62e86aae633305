//! Core value types for ledger transactions.
//!
//! These types form the vocabulary of every transaction the signer builds.
//! They are small and `Copy` where possible, and every constructor that
//! accepts untrusted input validates it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::crypto::hash::HASH_256_LENGTH;

/// Errors raised by the validating constructors in this module.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueError {
    #[error("malformed quantity {input:?}: expected a non-negative integer")]
    MalformedQuantity { input: String },

    #[error("lovelace arithmetic overflow")]
    Overflow,

    #[error("malformed transaction hash {input:?}: expected 64 hex characters")]
    MalformedHash { input: String },
}

// ---------------------------------------------------------------------------
// Lovelace
// ---------------------------------------------------------------------------

/// An amount of lovelace, the smallest indivisible unit of ada.
///
/// `1_000_000` lovelace is one ada. No floating point anywhere near money, and
/// no wrapping arithmetic either: every operation is checked.
///
/// # Examples
///
/// ```
/// use remit_protocol::transaction::types::Lovelace;
///
/// let five_ada: Lovelace = "5000000".parse().unwrap();
/// assert_eq!(five_ada, Lovelace::new(5_000_000));
/// assert_eq!(five_ada.display_ada(), "5.000000 ADA");
/// ```
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Lovelace(u64);

impl Lovelace {
    pub const ZERO: Lovelace = Lovelace(0);

    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub const fn as_u64(self) -> u64 {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(self, other: Lovelace) -> Result<Lovelace, ValueError> {
        self.0.checked_add(other.0).map(Lovelace).ok_or(ValueError::Overflow)
    }

    /// Returns `None` when `other` exceeds `self`; callers decide what a
    /// deficit means in their context.
    pub fn checked_sub(self, other: Lovelace) -> Option<Lovelace> {
        self.0.checked_sub(other.0).map(Lovelace)
    }

    pub fn checked_mul(self, factor: u64) -> Result<Lovelace, ValueError> {
        self.0.checked_mul(factor).map(Lovelace).ok_or(ValueError::Overflow)
    }

    /// Sums an iterator of amounts, failing on overflow.
    pub fn checked_sum<I>(amounts: I) -> Result<Lovelace, ValueError>
    where
        I: IntoIterator<Item = Lovelace>,
    {
        amounts
            .into_iter()
            .try_fold(Lovelace::ZERO, |acc, amount| acc.checked_add(amount))
    }

    /// Human-readable ada amount with six decimals.
    pub fn display_ada(self) -> String {
        format!("{}.{:06} ADA", self.0 / 1_000_000, self.0 % 1_000_000)
    }
}

impl FromStr for Lovelace {
    type Err = ValueError;

    /// Parses a decimal integer string. Signs, decimal points, whitespace and
    /// exponents are all rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ValueError::MalformedQuantity { input: s.to_string() });
        }
        s.parse::<u64>()
            .map(Lovelace)
            .map_err(|_| ValueError::MalformedQuantity { input: s.to_string() })
    }
}

impl fmt::Display for Lovelace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} lovelace", self.0)
    }
}

// ---------------------------------------------------------------------------
// TransactionHash
// ---------------------------------------------------------------------------

/// BLAKE2b-256 hash of a transaction body.
///
/// Doubles as the transaction id: the id a node reports after submission is
/// the hex encoding of this hash.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TransactionHash([u8; HASH_256_LENGTH]);

impl TransactionHash {
    pub fn from_bytes(bytes: [u8; HASH_256_LENGTH]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; HASH_256_LENGTH] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl FromStr for TransactionHash {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || ValueError::MalformedHash { input: s.to_string() };
        let bytes = hex::decode(s).map_err(|_| malformed())?;
        let arr: [u8; HASH_256_LENGTH] = bytes.try_into().map_err(|_| malformed())?;
        Ok(Self(arr))
    }
}

impl fmt::Display for TransactionHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for TransactionHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TransactionHash({})", self.to_hex())
    }
}

// ---------------------------------------------------------------------------
// TransactionId
// ---------------------------------------------------------------------------

/// Identifier returned by the chain service for a submitted transaction.
///
/// Kept as an opaque string: the service is the authority on what it
/// accepted, and we report its answer verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(String);

impl TransactionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lovelace_parses_decimal_strings() {
        assert_eq!("0".parse::<Lovelace>().unwrap(), Lovelace::ZERO);
        assert_eq!("340000000".parse::<Lovelace>().unwrap(), Lovelace::new(340_000_000));
    }

    #[test]
    fn lovelace_rejects_malformed_strings() {
        for bad in ["", "-5", "+5", "1.5", "1e6", " 12", "12 ", "abc", "99999999999999999999"] {
            assert!(bad.parse::<Lovelace>().is_err(), "{bad:?} must be rejected");
        }
    }

    #[test]
    fn lovelace_checked_arithmetic() {
        let a = Lovelace::new(u64::MAX);
        assert_eq!(a.checked_add(Lovelace::new(1)), Err(ValueError::Overflow));
        assert_eq!(Lovelace::new(5).checked_sub(Lovelace::new(6)), None);
        assert_eq!(Lovelace::new(44).checked_mul(300).unwrap(), Lovelace::new(13_200));
        assert!(Lovelace::new(u64::MAX / 2 + 1).checked_mul(2).is_err());
    }

    #[test]
    fn lovelace_checked_sum() {
        let total = Lovelace::checked_sum([1, 2, 3].map(Lovelace::new)).unwrap();
        assert_eq!(total, Lovelace::new(6));
        assert!(Lovelace::checked_sum([Lovelace::new(u64::MAX), Lovelace::new(1)]).is_err());
        assert_eq!(Lovelace::checked_sum([]).unwrap(), Lovelace::ZERO);
    }

    #[test]
    fn lovelace_display_ada() {
        assert_eq!(Lovelace::new(1_500_000).display_ada(), "1.500000 ADA");
        assert_eq!(Lovelace::new(42).display_ada(), "0.000042 ADA");
    }

    #[test]
    fn transaction_hash_hex_parsing() {
        let hex_str = "ab".repeat(32);
        let hash: TransactionHash = hex_str.parse().unwrap();
        assert_eq!(hash.to_hex(), hex_str);
        assert!("abcd".parse::<TransactionHash>().is_err());
        assert!("zz".repeat(32).parse::<TransactionHash>().is_err());
    }

    #[test]
    fn transaction_hash_orders_bytewise() {
        let low: TransactionHash = "00".repeat(32).parse().unwrap();
        let high: TransactionHash = "ff".repeat(32).parse().unwrap();
        assert!(low < high);
    }
}
