//! Shelley-era payment addresses.
//!
//! An address is parsed from its bech32 text form exactly once and then
//! carried around as raw bytes; outputs serialize the bytes, logs display the
//! original bech32 string.
//!
//! Byte layout: one header byte (high nibble = address type, low nibble =
//! network id) followed by a 28-byte payment credential and, for base and
//! pointer addresses, a delegation part.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::crypto::hash::HASH_224_LENGTH;
use crate::crypto::keys::KeyHash;

/// Bech32 prefix of mainnet payment addresses.
pub const MAINNET_HRP: &str = "addr";

/// Bech32 prefix of payment addresses on every test network.
pub const TESTNET_HRP: &str = "addr_test";

/// Network id encoded in the header of mainnet addresses.
pub const MAINNET_NETWORK_ID: u8 = 1;

/// Network id encoded in the header of test network addresses.
pub const TESTNET_NETWORK_ID: u8 = 0;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("invalid bech32 address: {0}")]
    Bech32(String),

    #[error("unsupported address prefix {0:?}: expected addr or addr_test")]
    UnsupportedPrefix(String),

    #[error("unsupported address type {0}: only base, pointer and enterprise addresses can receive funds")]
    UnsupportedType(u8),

    #[error("address network id {header} does not match prefix {hrp:?}")]
    NetworkMismatch { hrp: String, header: u8 },

    #[error("address payload has invalid length {0}")]
    InvalidLength(usize),
}

/// A parsed Shelley payment address.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Address {
    bech32: String,
    bytes: Vec<u8>,
}

impl Address {
    /// Raw address bytes, as they appear inside a transaction output.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// The bech32 text this address was parsed from.
    pub fn as_bech32(&self) -> &str {
        &self.bech32
    }

    fn address_type(&self) -> u8 {
        self.bytes[0] >> 4
    }

    /// Network id from the header's low nibble.
    pub fn network_id(&self) -> u8 {
        self.bytes[0] & 0x0f
    }

    pub fn is_mainnet(&self) -> bool {
        self.network_id() == MAINNET_NETWORK_ID
    }

    /// The payment key hash, when the payment credential is a key rather
    /// than a script. Types 0, 2, 4 and 6 carry a key hash.
    pub fn payment_key_hash(&self) -> Option<KeyHash> {
        if self.address_type() & 1 != 0 {
            return None;
        }
        let credential: [u8; HASH_224_LENGTH] =
            self.bytes[1..1 + HASH_224_LENGTH].try_into().ok()?;
        Some(KeyHash::from_bytes(credential))
    }

    /// Builds an enterprise address (payment key, no delegation part) for a
    /// key hash.
    pub fn enterprise(key_hash: &KeyHash, mainnet: bool) -> Result<Self, AddressError> {
        let (hrp, network) = if mainnet {
            (MAINNET_HRP, MAINNET_NETWORK_ID)
        } else {
            (TESTNET_HRP, TESTNET_NETWORK_ID)
        };
        let mut bytes = Vec::with_capacity(1 + HASH_224_LENGTH);
        bytes.push(0x60 | network);
        bytes.extend_from_slice(key_hash.as_bytes());

        let hrp = bech32::Hrp::parse(hrp).map_err(|e| AddressError::Bech32(e.to_string()))?;
        let bech32 = bech32::encode::<bech32::Bech32>(hrp, &bytes)
            .map_err(|e| AddressError::Bech32(e.to_string()))?;
        Ok(Self { bech32, bytes })
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (hrp, bytes) = bech32::decode(s).map_err(|e| AddressError::Bech32(e.to_string()))?;
        let hrp = hrp.as_str().to_ascii_lowercase();

        let expected_network = match hrp.as_str() {
            MAINNET_HRP => MAINNET_NETWORK_ID,
            TESTNET_HRP => TESTNET_NETWORK_ID,
            _ => return Err(AddressError::UnsupportedPrefix(hrp)),
        };

        let Some(&header) = bytes.first() else {
            return Err(AddressError::InvalidLength(0));
        };
        let address_type = header >> 4;
        let network_id = header & 0x0f;

        // Base addresses carry two credentials, enterprise one, pointer one
        // plus at least three variable-length integers.
        let valid_length = match address_type {
            0..=3 => bytes.len() == 1 + 2 * HASH_224_LENGTH,
            4 | 5 => bytes.len() >= 1 + HASH_224_LENGTH + 3,
            6 | 7 => bytes.len() == 1 + HASH_224_LENGTH,
            other => return Err(AddressError::UnsupportedType(other)),
        };
        if !valid_length {
            return Err(AddressError::InvalidLength(bytes.len()));
        }
        if network_id != expected_network {
            return Err(AddressError::NetworkMismatch { hrp, header: network_id });
        }

        Ok(Self {
            bech32: s.to_ascii_lowercase(),
            bytes,
        })
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.bech32)
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.bech32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(hrp: &str, bytes: &[u8]) -> String {
        bech32::encode::<bech32::Bech32>(bech32::Hrp::parse(hrp).unwrap(), bytes).unwrap()
    }

    #[test]
    fn parses_testnet_base_address() {
        let mut bytes = vec![0x00];
        bytes.extend_from_slice(&[0x11; 28]);
        bytes.extend_from_slice(&[0x22; 28]);
        let addr: Address = encode(TESTNET_HRP, &bytes).parse().unwrap();

        assert_eq!(addr.as_bytes(), bytes.as_slice());
        assert!(!addr.is_mainnet());
        assert_eq!(addr.payment_key_hash(), Some(KeyHash::from_bytes([0x11; 28])));
    }

    #[test]
    fn parses_mainnet_enterprise_address() {
        let mut bytes = vec![0x61];
        bytes.extend_from_slice(&[0x33; 28]);
        let addr: Address = encode(MAINNET_HRP, &bytes).parse().unwrap();

        assert!(addr.is_mainnet());
        assert_eq!(addr.as_bytes().len(), 29);
        assert_eq!(addr.to_string(), encode(MAINNET_HRP, &bytes));
    }

    #[test]
    fn script_payment_credential_has_no_key_hash() {
        let mut bytes = vec![0x71];
        bytes.extend_from_slice(&[0x44; 28]);
        let addr: Address = encode(MAINNET_HRP, &bytes).parse().unwrap();
        assert_eq!(addr.payment_key_hash(), None);
    }

    #[test]
    fn rejects_network_mismatch() {
        let mut bytes = vec![0x61];
        bytes.extend_from_slice(&[0x33; 28]);
        let err = encode(TESTNET_HRP, &bytes).parse::<Address>().unwrap_err();
        assert!(matches!(err, AddressError::NetworkMismatch { header: 1, .. }));
    }

    #[test]
    fn rejects_reward_addresses_and_foreign_prefixes() {
        let mut bytes = vec![0xe1];
        bytes.extend_from_slice(&[0x55; 28]);
        assert!(matches!(
            encode(MAINNET_HRP, &bytes).parse::<Address>(),
            Err(AddressError::UnsupportedType(14))
        ));
        assert!(matches!(
            encode("stake", &bytes).parse::<Address>(),
            Err(AddressError::UnsupportedPrefix(_))
        ));
    }

    #[test]
    fn rejects_truncated_payload() {
        let bytes = vec![0x60, 0x01, 0x02];
        assert!(matches!(
            encode(TESTNET_HRP, &bytes).parse::<Address>(),
            Err(AddressError::InvalidLength(3))
        ));
    }

    #[test]
    fn rejects_garbage() {
        assert!("not an address".parse::<Address>().is_err());
        assert!("".parse::<Address>().is_err());
    }

    #[test]
    fn enterprise_address_roundtrips_key_hash() {
        let kh = KeyHash::from_bytes([0x42; 28]);
        let addr = Address::enterprise(&kh, false).unwrap();
        assert_eq!(addr.payment_key_hash(), Some(kh));
        assert!(addr.as_bech32().starts_with("addr_test1"));

        let reparsed: Address = addr.as_bech32().parse().unwrap();
        assert_eq!(reparsed, addr);
    }
}
