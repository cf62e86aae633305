//! Transaction metadata: human-readable annotation lines attached as
//! auxiliary data.
//!
//! Each line becomes a text metadatum under an integer label equal to its
//! position (0, 1, 2, …). The encoded label map is the auxiliary data; its
//! BLAKE2b-256 hash goes into the transaction body, the map itself travels
//! next to the body in the signed transaction.

use minicbor::encode::{Error, Write};
use minicbor::{Encode, Encoder};
use std::fmt;
use thiserror::Error;

use super::cbor;
use crate::config::MAX_METADATA_TEXT_BYTES;
use crate::crypto::hash::{blake2b_256, HASH_256_LENGTH};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MetadataError {
    #[error("metadata line {label} is {len} bytes, a text metadatum holds at most {max}")]
    TextTooLong { label: u64, len: usize, max: usize },
}

/// Checks every line against the text metadatum size limit.
pub fn validate_lines(lines: &[String]) -> Result<(), MetadataError> {
    for (label, line) in lines.iter().enumerate() {
        if line.len() > MAX_METADATA_TEXT_BYTES {
            return Err(MetadataError::TextTooLong {
                label: label as u64,
                len: line.len(),
                max: MAX_METADATA_TEXT_BYTES,
            });
        }
    }
    Ok(())
}

/// One labelled metadatum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataEntry {
    pub label: u64,
    pub text: String,
}

/// BLAKE2b-256 of the encoded auxiliary data.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct AuxiliaryDataHash([u8; HASH_256_LENGTH]);

impl AuxiliaryDataHash {
    pub fn as_bytes(&self) -> &[u8; HASH_256_LENGTH] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for AuxiliaryDataHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AuxiliaryDataHash({})", self.to_hex())
    }
}

/// Labelled metadata attached to a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuxiliaryData {
    entries: Vec<MetadataEntry>,
}

impl AuxiliaryData {
    /// Labels `lines` sequentially from 0 in the order given.
    pub fn from_lines(lines: &[String]) -> Result<Self, MetadataError> {
        validate_lines(lines)?;
        let entries = lines
            .iter()
            .enumerate()
            .map(|(label, text)| MetadataEntry {
                label: label as u64,
                text: text.clone(),
            })
            .collect();
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[MetadataEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn to_cbor(&self) -> Vec<u8> {
        cbor::to_vec(self)
    }

    /// Content hash over the complete encoded metadata map.
    pub fn hash(&self) -> AuxiliaryDataHash {
        AuxiliaryDataHash(blake2b_256(&self.to_cbor()))
    }
}

impl<C> Encode<C> for AuxiliaryData {
    /// `{ label => text }`, labels ascending.
    fn encode<W: Write>(&self, e: &mut Encoder<W>, _ctx: &mut C) -> Result<(), Error<W::Error>> {
        e.map(self.entries.len() as u64)?;
        for entry in &self.entries {
            e.u64(entry.label)?.str(&entry.text)?;
        }
        Ok(())
    }
}

/// Builds the auxiliary data for a list of annotation lines.
///
/// An empty list means "no auxiliary data": the body then carries no
/// auxiliary data hash at all.
pub fn encode_metadata(lines: &[String]) -> Result<Option<AuxiliaryData>, MetadataError> {
    let data = AuxiliaryData::from_lines(lines)?;
    Ok((!data.is_empty()).then_some(data))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn labels_are_sequential_from_zero() {
        let data = AuxiliaryData::from_lines(&lines(&["a", "b", "c"])).unwrap();
        let labels: Vec<u64> = data.entries().iter().map(|e| e.label).collect();
        assert_eq!(labels, vec![0, 1, 2]);
        assert_eq!(data.entries()[2].text, "c");
    }

    #[test]
    fn hash_is_deterministic() {
        let input = lines(&["This automated transaction is powered by remit 🥳"]);
        let first = AuxiliaryData::from_lines(&input).unwrap().hash();
        let second = AuxiliaryData::from_lines(&input).unwrap().hash();
        assert_eq!(first, second);
    }

    #[test]
    fn order_changes_the_hash() {
        let ab = AuxiliaryData::from_lines(&lines(&["a", "b"])).unwrap().hash();
        let ba = AuxiliaryData::from_lines(&lines(&["b", "a"])).unwrap().hash();
        assert_ne!(ab, ba);
    }

    #[test]
    fn encodes_as_label_map() {
        let data = AuxiliaryData::from_lines(&lines(&["hi"])).unwrap();
        // map(1) { 0: "hi" }
        assert_eq!(data.to_cbor(), vec![0xa1, 0x00, 0x62, b'h', b'i']);
        assert_eq!(data.hash().as_bytes(), &blake2b_256(&data.to_cbor()));
    }

    #[test]
    fn limit_is_measured_in_utf8_bytes() {
        // 16 four-byte emoji = 64 bytes: allowed. One more character is not.
        let at_limit = "🥳".repeat(16);
        assert!(validate_lines(&[at_limit.clone()]).is_ok());
        let over = format!("{at_limit}!");
        assert_eq!(
            validate_lines(&[String::from("ok"), over]),
            Err(MetadataError::TextTooLong { label: 1, len: 65, max: 64 })
        );
    }

    #[test]
    fn empty_list_produces_no_auxiliary_data() {
        assert_eq!(encode_metadata(&[]).unwrap(), None);
        assert!(encode_metadata(&lines(&["x"])).unwrap().is_some());
    }
}
