//! # Cryptographic Primitives
//!
//! Everything security-related in the signer flows through here: the
//! BLAKE2b digests the ledger mandates and the Ed25519 payment key.
//!
//! Everything here is a thin, type-safe wrapper around audited
//! implementations (`blake2`, `ed25519-dalek`). We don't roll our own.

pub mod hash;
pub mod keys;

pub use hash::{blake2b_224, blake2b_256};
pub use keys::{Ed25519Signature, KeyError, KeyHash, PaymentKeypair, VerificationKey};
