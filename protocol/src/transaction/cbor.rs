//! Canonical CBOR helpers.
//!
//! Every ledger structure encodes itself through a `minicbor::Encode` impl
//! that writes definite-length arrays and maps with keys in ascending order.
//! That is the canonical form: the same value always yields the same bytes,
//! which is what makes hashes reproducible.

use minicbor::encode::{Error, Write};
use minicbor::{Encode, Encoder};

/// Encodes a value into a fresh byte vector.
pub fn to_vec<T: Encode<()>>(value: &T) -> Vec<u8> {
    // Writing into a `Vec` cannot fail and none of our `Encode` impls raise
    // custom errors.
    minicbor::to_vec(value).expect("CBOR encoding into a Vec is infallible")
}

/// Encoded length of a value in bytes.
pub fn encoded_len<T: Encode<()>>(value: &T) -> usize {
    to_vec(value).len()
}

/// Writes bytes that are already valid CBOR without re-encoding them.
///
/// Used to embed a frozen transaction body verbatim, so the bytes that were
/// hashed are exactly the bytes that get signed and submitted.
pub fn write_raw<W: Write>(e: &mut Encoder<W>, cbor: &[u8]) -> Result<(), Error<W::Error>> {
    e.writer_mut().write_all(cbor).map_err(Error::write)
}
