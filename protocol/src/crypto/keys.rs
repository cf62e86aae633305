//! # Key Management
//!
//! Ed25519 payment keys: loading the sender's secret key, deriving its
//! verification key and key hash, and producing signatures.
//!
//! ## Accepted secret key encodings
//!
//! - 64 hex characters: the raw 32-byte Ed25519 seed.
//! - 68 hex characters starting with `5820`: the same seed wrapped as a CBOR
//!   byte string, which is what `cardano-cli` writes into the `cborHex` field
//!   of a `PaymentSigningKeyShelley_ed25519` envelope.
//! - Bech32 with the `ed25519_sk` prefix.
//!
//! Extended (BIP32-Ed25519, 64-byte) keys are not supported.
//!
//! ## Security considerations
//!
//! - Private keys are zeroized on drop (thanks, ed25519-dalek).
//! - Key bytes are never logged and never printed by `Debug`.

use ed25519_dalek::{
    Signature as DalekSignature, Signer, SigningKey, Verifier, VerifyingKey, SECRET_KEY_LENGTH,
};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use super::hash::{blake2b_224, HASH_224_LENGTH};

/// Bech32 human-readable prefix for plain Ed25519 secret keys.
pub const SECRET_KEY_BECH32_HRP: &str = "ed25519_sk";

/// CBOR header of a 32-byte byte string (major type 2, one-byte length 0x20).
const CBOR_BYTES32_HEADER: [u8; 2] = [0x58, 0x20];

/// Errors that can occur during key operations.
///
/// These are intentionally vague about *why* something failed; leaking
/// details about key material through error messages is a classic footgun.
#[derive(Debug, Error)]
pub enum KeyError {
    #[error("invalid secret key: expected a 32-byte Ed25519 key as hex, cbor hex or bech32")]
    InvalidSecretKey,

    #[error("invalid verification key bytes: not a valid Ed25519 point")]
    InvalidPublicKey,

    #[error("signing key hash {actual} does not own input key hash {expected}")]
    KeyHashMismatch { expected: String, actual: String },
}

// ---------------------------------------------------------------------------
// KeyHash
// ---------------------------------------------------------------------------

/// BLAKE2b-224 hash of a verification key.
///
/// This is the payment credential carried by key-based Shelley addresses and
/// the identity recorded on each transaction input for signing authority.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct KeyHash([u8; HASH_224_LENGTH]);

impl KeyHash {
    pub fn from_bytes(bytes: [u8; HASH_224_LENGTH]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; HASH_224_LENGTH] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for KeyHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for KeyHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KeyHash({})", self.to_hex())
    }
}

// ---------------------------------------------------------------------------
// PaymentKeypair
// ---------------------------------------------------------------------------

/// The sender's Ed25519 payment keypair.
///
/// `PaymentKeypair` intentionally does NOT implement `Serialize`,
/// `Deserialize` or `Clone`. The key is parsed once from configuration and
/// borrowed by the signer; there is no reason for a second copy to exist.
///
/// # Examples
///
/// ```
/// use remit_protocol::crypto::keys::PaymentKeypair;
///
/// let kp = PaymentKeypair::generate();
/// let msg = b"send 5 ada to alice";
/// let sig = kp.sign(msg);
/// assert!(kp.verification_key().verify(msg, &sig));
/// ```
pub struct PaymentKeypair {
    signing_key: SigningKey,
}

impl PaymentKeypair {
    /// Generate a fresh keypair using the OS cryptographic RNG.
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::generate(&mut OsRng),
        }
    }

    /// Constructs a keypair deterministically from a 32-byte seed.
    pub fn from_seed(seed: &[u8; SECRET_KEY_LENGTH]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(seed),
        }
    }

    /// Parse any of the supported secret key encodings (see module docs).
    ///
    /// Surrounding whitespace is ignored so that keys pasted from files with
    /// a trailing newline still load.
    pub fn parse(encoded: &str) -> Result<Self, KeyError> {
        let encoded = encoded.trim();
        if encoded
            .get(..SECRET_KEY_BECH32_HRP.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(SECRET_KEY_BECH32_HRP))
        {
            return Self::from_bech32(encoded);
        }
        Self::from_hex(encoded)
    }

    /// Reconstruct a keypair from a hex-encoded secret key, raw or CBOR-wrapped.
    pub fn from_hex(hex_str: &str) -> Result<Self, KeyError> {
        let bytes = hex::decode(hex_str).map_err(|_| KeyError::InvalidSecretKey)?;
        let seed = match bytes.len() {
            SECRET_KEY_LENGTH => bytes.as_slice(),
            n if n == SECRET_KEY_LENGTH + 2 && bytes[..2] == CBOR_BYTES32_HEADER => &bytes[2..],
            _ => return Err(KeyError::InvalidSecretKey),
        };
        Self::from_slice(seed)
    }

    /// Reconstruct a keypair from a bech32 `ed25519_sk1...` string.
    pub fn from_bech32(encoded: &str) -> Result<Self, KeyError> {
        let (hrp, data) = bech32::decode(encoded).map_err(|_| KeyError::InvalidSecretKey)?;
        if !hrp.as_str().eq_ignore_ascii_case(SECRET_KEY_BECH32_HRP) {
            return Err(KeyError::InvalidSecretKey);
        }
        Self::from_slice(&data)
    }

    fn from_slice(bytes: &[u8]) -> Result<Self, KeyError> {
        let seed: [u8; SECRET_KEY_LENGTH] =
            bytes.try_into().map_err(|_| KeyError::InvalidSecretKey)?;
        Ok(Self::from_seed(&seed))
    }

    /// Returns the verification (public) key.
    pub fn verification_key(&self) -> VerificationKey {
        VerificationKey {
            bytes: self.signing_key.verifying_key().to_bytes(),
        }
    }

    /// BLAKE2b-224 of the verification key.
    pub fn key_hash(&self) -> KeyHash {
        self.verification_key().hash()
    }

    /// Sign a message. Ed25519 is deterministic: same key and message, same
    /// signature.
    pub fn sign(&self, message: &[u8]) -> Ed25519Signature {
        Ed25519Signature {
            bytes: self.signing_key.sign(message).to_bytes(),
        }
    }
}

impl fmt::Debug for PaymentKeypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Never print secret key material in debug output. Not even "partially."
        write!(f, "PaymentKeypair(vkh={})", self.key_hash())
    }
}

// ---------------------------------------------------------------------------
// VerificationKey
// ---------------------------------------------------------------------------

/// The public half of the payment keypair, carried in every vkey witness.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VerificationKey {
    bytes: [u8; 32],
}

impl VerificationKey {
    /// Validates that the bytes are a usable Ed25519 point.
    pub fn try_from_slice(slice: &[u8]) -> Result<Self, KeyError> {
        let bytes: [u8; 32] = slice.try_into().map_err(|_| KeyError::InvalidPublicKey)?;
        VerifyingKey::from_bytes(&bytes).map_err(|_| KeyError::InvalidPublicKey)?;
        Ok(Self { bytes })
    }

    /// An all-zero key of the right length. Only for measuring encoded
    /// sizes; it never verifies anything.
    pub(crate) const fn placeholder() -> Self {
        Self { bytes: [0u8; 32] }
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.bytes
    }

    pub fn hash(&self) -> KeyHash {
        KeyHash(blake2b_224(&self.bytes))
    }

    /// Returns `true` if `signature` is a valid signature of `message`.
    pub fn verify(&self, message: &[u8], signature: &Ed25519Signature) -> bool {
        let Ok(verifying_key) = VerifyingKey::from_bytes(&self.bytes) else {
            return false;
        };
        let dalek_sig = DalekSignature::from_bytes(&signature.bytes);
        verifying_key.verify(message, &dalek_sig).is_ok()
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.bytes)
    }
}

impl fmt::Display for VerificationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for VerificationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VerificationKey({})", &self.to_hex()[..16])
    }
}

// ---------------------------------------------------------------------------
// Ed25519Signature
// ---------------------------------------------------------------------------

/// A 64-byte Ed25519 signature.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Ed25519Signature {
    bytes: [u8; 64],
}

impl Ed25519Signature {
    pub fn from_bytes(bytes: [u8; 64]) -> Self {
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.bytes
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.bytes)
    }
}

impl fmt::Debug for Ed25519Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hex_str = self.to_hex();
        write!(f, "Ed25519Signature({}...{})", &hex_str[..8], &hex_str[120..])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEED_HEX: &str = "616c6973736f6e2e6c696e6e656b657200000000000000000000000000000000";

    #[test]
    fn sign_verify_roundtrip() {
        let kp = PaymentKeypair::generate();
        let sig = kp.sign(b"transfer 100 ada");
        assert!(kp.verification_key().verify(b"transfer 100 ada", &sig));
    }

    #[test]
    fn wrong_message_fails_verification() {
        let kp = PaymentKeypair::generate();
        let sig = kp.sign(b"correct message");
        assert!(!kp.verification_key().verify(b"wrong message", &sig));
    }

    #[test]
    fn wrong_key_fails_verification() {
        let kp1 = PaymentKeypair::generate();
        let kp2 = PaymentKeypair::generate();
        let sig = kp1.sign(b"message");
        assert!(!kp2.verification_key().verify(b"message", &sig));
    }

    #[test]
    fn parses_raw_hex() {
        let kp = PaymentKeypair::parse(SEED_HEX).unwrap();
        let seed: [u8; 32] = hex::decode(SEED_HEX).unwrap().try_into().unwrap();
        assert_eq!(kp.verification_key(), PaymentKeypair::from_seed(&seed).verification_key());
    }

    #[test]
    fn parses_cbor_wrapped_hex() {
        let raw = PaymentKeypair::parse(SEED_HEX).unwrap();
        let wrapped = PaymentKeypair::parse(&format!("5820{SEED_HEX}\n")).unwrap();
        assert_eq!(raw.key_hash(), wrapped.key_hash());
    }

    #[test]
    fn parses_bech32() {
        let seed: Vec<u8> = hex::decode(SEED_HEX).unwrap();
        let hrp = bech32::Hrp::parse(SECRET_KEY_BECH32_HRP).unwrap();
        let encoded = bech32::encode::<bech32::Bech32>(hrp, &seed).unwrap();

        let from_bech = PaymentKeypair::parse(&encoded).unwrap();
        let from_hex = PaymentKeypair::parse(SEED_HEX).unwrap();
        assert_eq!(from_bech.key_hash(), from_hex.key_hash());
    }

    #[test]
    fn rejects_malformed_keys() {
        assert!(PaymentKeypair::parse("deadbeef").is_err());
        assert!(PaymentKeypair::parse("not-hex-at-all").is_err());
        assert!(PaymentKeypair::parse("").is_err());
        // 64-byte extended keys are out of scope.
        assert!(PaymentKeypair::parse(&format!("{SEED_HEX}{SEED_HEX}")).is_err());
        // Right length, wrong CBOR header.
        assert!(PaymentKeypair::parse(&format!("5840{SEED_HEX}")).is_err());
    }

    #[test]
    fn bech32_with_wrong_prefix_rejected() {
        let seed: Vec<u8> = hex::decode(SEED_HEX).unwrap();
        let hrp = bech32::Hrp::parse("ed25519_vk").unwrap();
        let encoded = bech32::encode::<bech32::Bech32>(hrp, &seed).unwrap();
        assert!(PaymentKeypair::from_bech32(&encoded).is_err());
    }

    #[test]
    fn key_hash_is_blake2b_224_of_vkey() {
        let kp = PaymentKeypair::parse(SEED_HEX).unwrap();
        let vkey = kp.verification_key();
        assert_eq!(kp.key_hash().as_bytes(), &blake2b_224(vkey.as_bytes()));
    }

    #[test]
    fn verification_key_rejects_wrong_length() {
        assert!(VerificationKey::try_from_slice(&[0u8; 16]).is_err());
    }

    #[test]
    fn deterministic_signatures() {
        let kp = PaymentKeypair::parse(SEED_HEX).unwrap();
        assert_eq!(kp.sign(b"same"), kp.sign(b"same"));
    }

    #[test]
    fn debug_does_not_leak_secret() {
        let kp = PaymentKeypair::parse(SEED_HEX).unwrap();
        let debug_str = format!("{:?}", kp);
        assert!(debug_str.starts_with("PaymentKeypair(vkh="));
        assert!(!debug_str.contains(SEED_HEX));
    }
}
