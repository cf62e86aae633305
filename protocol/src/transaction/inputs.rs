//! Input collection: every spendable output of the sender becomes an input.
//!
//! There is no coin selection. The collector takes the whole UTXO set, orders
//! it canonically by `(tx_hash, index)` and sums it with checked arithmetic.

use minicbor::encode::{Error, Write};
use minicbor::{Encode, Encoder};

use super::error::{BuildError, FundsError};
use super::types::{Lovelace, TransactionHash};
use crate::chain::UnspentOutput;
use crate::crypto::keys::KeyHash;

/// A reference to a consumed output, the value it contributes, and the key
/// hash that must witness it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionInput {
    pub tx_hash: TransactionHash,
    pub index: u32,
    pub value: Lovelace,
    pub owner: KeyHash,
}

impl<C> Encode<C> for TransactionInput {
    /// `[tx_hash, index]`. Value and owner are not part of the wire form.
    fn encode<W: Write>(&self, e: &mut Encoder<W>, _ctx: &mut C) -> Result<(), Error<W::Error>> {
        e.array(2)?.bytes(self.tx_hash.as_bytes())?.u32(self.index)?;
        Ok(())
    }
}

/// Inputs in canonical order plus their summed value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectedInputs {
    pub inputs: Vec<TransactionInput>,
    pub total: Lovelace,
}

/// Turns the sender's UTXO set into transaction inputs owned by `owner`.
///
/// Outputs holding native assets are skipped: spending them would need a
/// multi-asset change output.
pub fn collect_inputs(
    utxos: &[UnspentOutput],
    owner: KeyHash,
) -> Result<CollectedInputs, BuildError> {
    let mut inputs: Vec<TransactionInput> = Vec::with_capacity(utxos.len());
    for utxo in utxos {
        if utxo.has_native_assets {
            tracing::warn!(
                tx_hash = %utxo.tx_hash.to_hex(),
                index = utxo.output_index,
                "skipping output carrying native assets"
            );
            continue;
        }
        inputs.push(TransactionInput {
            tx_hash: utxo.tx_hash,
            index: utxo.output_index,
            value: utxo.lovelace,
            owner,
        });
    }

    if inputs.is_empty() {
        return Err(FundsError::NoSpendableOutputs.into());
    }

    inputs.sort_by(|a, b| (a.tx_hash, a.index).cmp(&(b.tx_hash, b.index)));
    let total = Lovelace::checked_sum(inputs.iter().map(|i| i.value))?;

    Ok(CollectedInputs { inputs, total })
}
