//! Transaction body construction via the builder pattern.
//!
//! The [`TransactionBuilder`] collects inputs, outputs, fee, ttl and the
//! auxiliary data hash, checks the body is balanced, and returns a
//! [`TransactionBody`]. Calling [`TransactionBody::freeze`] encodes the body
//! once and hashes those bytes; the resulting [`FrozenBody`] is what the
//! signer and the serializer work from.
//!
//! The builder does not sign -- that happens in [`super::signing`]. This
//! separation keeps construction testable without key material.

use minicbor::encode::{Error, Write};
use minicbor::{Encode, Encoder};

use super::cbor;
use super::error::BuildError;
use super::inputs::TransactionInput;
use super::metadata::AuxiliaryDataHash;
use super::outputs::TransactionOutput;
use super::types::{Lovelace, TransactionHash, TransactionId};
use crate::crypto::hash::blake2b_256;

/// Body map keys.
const KEY_INPUTS: u64 = 0;
const KEY_OUTPUTS: u64 = 1;
const KEY_FEE: u64 = 2;
const KEY_TTL: u64 = 3;
const KEY_AUXILIARY_DATA_HASH: u64 = 7;

// ---------------------------------------------------------------------------
// TransactionBody
// ---------------------------------------------------------------------------

/// The signed-over part of a transaction.
///
/// Invariant: `sum(inputs) == sum(outputs) + fee`, checked by the builder.
///
/// # Canonical Byte Format
///
/// A CBOR map with ascending integer keys:
///
/// ```text
/// { 0: [[tx_hash, index], ...],
///   1: [[address_bytes, coin], ...],
///   2: fee,
///   3: ttl,
///   7: auxiliary_data_hash }      ; only when metadata is attached
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionBody {
    inputs: Vec<TransactionInput>,
    outputs: Vec<TransactionOutput>,
    fee: Lovelace,
    ttl: u64,
    auxiliary_data_hash: Option<AuxiliaryDataHash>,
}

impl TransactionBody {
    pub fn inputs(&self) -> &[TransactionInput] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[TransactionOutput] {
        &self.outputs
    }

    pub fn fee(&self) -> Lovelace {
        self.fee
    }

    /// Last slot in which the transaction is valid.
    pub fn ttl(&self) -> u64 {
        self.ttl
    }

    pub fn auxiliary_data_hash(&self) -> Option<&AuxiliaryDataHash> {
        self.auxiliary_data_hash.as_ref()
    }

    pub fn total_input(&self) -> Result<Lovelace, BuildError> {
        Ok(Lovelace::checked_sum(self.inputs.iter().map(|i| i.value))?)
    }

    pub fn total_output(&self) -> Result<Lovelace, BuildError> {
        Ok(Lovelace::checked_sum(self.outputs.iter().map(|o| o.value))?)
    }

    /// Encodes the body and hashes the encoding.
    ///
    /// The encoded bytes are kept: signing and serialization reuse exactly
    /// the bytes that were hashed.
    pub fn freeze(self) -> FrozenBody {
        let cbor = cbor::to_vec(&self);
        let hash = TransactionHash::from_bytes(blake2b_256(&cbor));
        FrozenBody {
            body: self,
            cbor,
            hash,
        }
    }
}

impl<C> Encode<C> for TransactionBody {
    fn encode<W: Write>(&self, e: &mut Encoder<W>, ctx: &mut C) -> Result<(), Error<W::Error>> {
        let entries = if self.auxiliary_data_hash.is_some() { 5 } else { 4 };
        e.map(entries)?;

        e.u64(KEY_INPUTS)?.array(self.inputs.len() as u64)?;
        for input in &self.inputs {
            input.encode(e, ctx)?;
        }

        e.u64(KEY_OUTPUTS)?.array(self.outputs.len() as u64)?;
        for output in &self.outputs {
            output.encode(e, ctx)?;
        }

        e.u64(KEY_FEE)?.u64(self.fee.as_u64())?;
        e.u64(KEY_TTL)?.u64(self.ttl)?;

        if let Some(hash) = &self.auxiliary_data_hash {
            e.u64(KEY_AUXILIARY_DATA_HASH)?.bytes(hash.as_bytes())?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// FrozenBody
// ---------------------------------------------------------------------------

/// A body whose encoding and hash are fixed. Exposes no mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrozenBody {
    body: TransactionBody,
    cbor: Vec<u8>,
    hash: TransactionHash,
}

impl FrozenBody {
    pub fn body(&self) -> &TransactionBody {
        &self.body
    }

    /// The canonical encoding the hash was computed over.
    pub fn cbor(&self) -> &[u8] {
        &self.cbor
    }

    /// BLAKE2b-256 of [`FrozenBody::cbor`]. This is what gets signed.
    pub fn hash(&self) -> &TransactionHash {
        &self.hash
    }

    /// The id the ledger will assign to the transaction.
    pub fn id(&self) -> TransactionId {
        TransactionId::new(self.hash.to_hex())
    }
}

// ---------------------------------------------------------------------------
// TransactionBuilder
// ---------------------------------------------------------------------------

/// Fluent builder for [`TransactionBody`].
///
/// # Usage
///
/// ```rust,no_run
/// # use remit_protocol::transaction::{TransactionBuilder, TransactionInput, TransactionOutput};
/// # fn demo(input: TransactionInput, pay: TransactionOutput, change: TransactionOutput) {
/// use remit_protocol::transaction::types::Lovelace;
///
/// let body = TransactionBuilder::new()
///     .input(input)
///     .output(pay)
///     .output(change)
///     .fee(Lovelace::new(170_000))
///     .ttl(71_234_767)
///     .build()
///     .expect("balanced body");
/// let frozen = body.freeze();
/// # }
/// ```
#[derive(Debug, Default)]
pub struct TransactionBuilder {
    inputs: Vec<TransactionInput>,
    outputs: Vec<TransactionOutput>,
    fee: Lovelace,
    ttl: u64,
    auxiliary_data_hash: Option<AuxiliaryDataHash>,
}

impl TransactionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn input(mut self, input: TransactionInput) -> Self {
        self.inputs.push(input);
        self
    }

    pub fn inputs(mut self, inputs: impl IntoIterator<Item = TransactionInput>) -> Self {
        self.inputs.extend(inputs);
        self
    }

    /// Appends an output. Outputs keep the order they were added in.
    pub fn output(mut self, output: TransactionOutput) -> Self {
        self.outputs.push(output);
        self
    }

    pub fn fee(mut self, fee: Lovelace) -> Self {
        self.fee = fee;
        self
    }

    pub fn ttl(mut self, ttl: u64) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn auxiliary_data_hash(mut self, hash: Option<AuxiliaryDataHash>) -> Self {
        self.auxiliary_data_hash = hash;
        self
    }

    /// Consumes the builder and produces a balanced [`TransactionBody`].
    ///
    /// # Errors
    ///
    /// - [`BuildError::NoInputs`] / [`BuildError::NoOutputs`] for an empty side.
    /// - [`BuildError::Unbalanced`] when inputs do not equal outputs plus fee.
    pub fn build(self) -> Result<TransactionBody, BuildError> {
        if self.inputs.is_empty() {
            return Err(BuildError::NoInputs);
        }
        if self.outputs.is_empty() {
            return Err(BuildError::NoOutputs);
        }

        let body = TransactionBody {
            inputs: self.inputs,
            outputs: self.outputs,
            fee: self.fee,
            ttl: self.ttl,
            auxiliary_data_hash: self.auxiliary_data_hash,
        };

        let inputs = body.total_input()?;
        let outputs = body.total_output()?;
        if outputs.checked_add(body.fee)? != inputs {
            return Err(BuildError::Unbalanced {
                inputs,
                outputs,
                fee: body.fee,
            });
        }
        Ok(body)
    }
}

/// Assembles and freezes a transfer body: inputs, the recipient output, an
/// optional change output, fee, ttl and the auxiliary data hash.
pub fn assemble_body(
    inputs: &[TransactionInput],
    recipient: &TransactionOutput,
    change: Option<&TransactionOutput>,
    fee: Lovelace,
    ttl: u64,
    auxiliary_data_hash: Option<AuxiliaryDataHash>,
) -> Result<FrozenBody, BuildError> {
    let mut builder = TransactionBuilder::new()
        .inputs(inputs.iter().cloned())
        .output(recipient.clone());
    if let Some(change) = change {
        builder = builder.output(change.clone());
    }
    let body = builder
        .fee(fee)
        .ttl(ttl)
        .auxiliary_data_hash(auxiliary_data_hash)
        .build()?;
    Ok(body.freeze())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
