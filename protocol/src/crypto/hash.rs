//! # Hashing Utilities
//!
//! The ledger uses exactly two digests, both from the BLAKE2b family, and we
//! refuse to grow that list without a very good reason:
//!
//! - **BLAKE2b-256** - transaction body hashes (the signing target and the
//!   transaction id) and the auxiliary data hash embedded in the body.
//! - **BLAKE2b-224** - verification key hashes, i.e. the payment credential
//!   inside a Shelley address.
//!
//! Both are thin wrappers over the `blake2` crate. The output sizes are fixed
//! by the ledger; anything else would simply not match what validators compute.

use blake2::digest::consts::{U28, U32};
use blake2::{Blake2b, Digest};

type Blake2b256 = Blake2b<U32>;
type Blake2b224 = Blake2b<U28>;

/// Length of a BLAKE2b-256 digest in bytes.
pub const HASH_256_LENGTH: usize = 32;

/// Length of a BLAKE2b-224 digest in bytes.
pub const HASH_224_LENGTH: usize = 28;

/// Compute the BLAKE2b-256 digest of `data`.
///
/// # Example
///
/// ```
/// use remit_protocol::crypto::blake2b_256;
///
/// let hash = blake2b_256(b"remit");
/// assert_eq!(hash.len(), 32);
/// ```
pub fn blake2b_256(data: &[u8]) -> [u8; HASH_256_LENGTH] {
    Blake2b256::digest(data).into()
}

/// Compute the BLAKE2b-224 digest of `data`.
///
/// Used for key hashes. 28 bytes is what the ledger puts in addresses and
/// required-signer sets.
pub fn blake2b_224(data: &[u8]) -> [u8; HASH_224_LENGTH] {
    Blake2b224::digest(data).into()
}
