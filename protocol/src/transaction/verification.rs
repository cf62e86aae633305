//! Transaction verification: structural checks and cryptographic validation.
//!
//! Every signed transaction is run through [`verify_transaction`] before it
//! leaves the process. The checks are ordered from cheapest to most
//! expensive (arithmetic before signature verification) to fail fast.

use thiserror::Error;

use super::signing::SignedTransaction;
use super::types::Lovelace;
use crate::crypto::hash::blake2b_256;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can occur during transaction verification.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransactionError {
    /// Inputs do not equal outputs plus fee, or the sums overflow.
    #[error("value not conserved: inputs {inputs}, outputs {outputs}, fee {fee}")]
    ValueNotConserved {
        inputs: Lovelace,
        outputs: Lovelace,
        fee: Lovelace,
    },

    /// The stored body hash is not the BLAKE2b-256 of the stored body bytes.
    #[error("body hash does not match body encoding")]
    BodyHashMismatch,

    /// Auxiliary data present without a body hash, or the other way around,
    /// or the hashes disagree.
    #[error("auxiliary data does not match the hash committed in the body")]
    AuxiliaryDataMismatch,

    /// The transaction carries no verification-key witness.
    #[error("transaction is unsigned")]
    MissingWitness,

    /// A witness signature does not verify against the body hash.
    #[error("invalid signature from verification key {vkey}")]
    InvalidSignature { vkey: String },

    /// An input is owned by a key hash no witness provides.
    #[error("input {tx_hash}#{index} is not authorized by any witness")]
    UnauthorizedInput { tx_hash: String, index: u32 },
}

// ---------------------------------------------------------------------------
// Verification
// ---------------------------------------------------------------------------

/// Verifies a signed transaction.
///
/// The checks, in order:
///
/// 1. **Conservation** -- `sum(inputs) == sum(outputs) + fee`.
/// 2. **Body hash** -- equals `blake2b_256(body_cbor)`.
/// 3. **Auxiliary data** -- present exactly when the body commits to a hash,
///    and hashes to it.
/// 4. **Witness present** -- at least one vkey witness.
/// 5. **Signatures** -- every witness verifies over the body hash.
/// 6. **Authorization** -- every input owner has a witness.
///
/// # Errors
///
/// Returns the first failing check as a [`TransactionError`].
pub fn verify_transaction(tx: &SignedTransaction) -> Result<(), TransactionError> {
    let frozen = tx.body();
    let body = frozen.body();

    // 1. Conservation, with overflow treated as imbalance.
    let inputs = Lovelace::checked_sum(body.inputs().iter().map(|i| i.value));
    let outputs = Lovelace::checked_sum(body.outputs().iter().map(|o| o.value));
    let balanced = match (&inputs, &outputs) {
        (Ok(i), Ok(o)) => o.checked_add(body.fee()).map(|total| total == *i).unwrap_or(false),
        _ => false,
    };
    if !balanced {
        return Err(TransactionError::ValueNotConserved {
            inputs: inputs.unwrap_or(Lovelace::new(u64::MAX)),
            outputs: outputs.unwrap_or(Lovelace::new(u64::MAX)),
            fee: body.fee(),
        });
    }

    // 2. Body hash.
    if frozen.hash().as_bytes() != &blake2b_256(frozen.cbor()) {
        return Err(TransactionError::BodyHashMismatch);
    }

    // 3. Auxiliary data commitment.
    match (tx.auxiliary_data(), body.auxiliary_data_hash()) {
        (None, None) => {}
        (Some(aux), Some(committed)) if aux.hash() == *committed => {}
        _ => return Err(TransactionError::AuxiliaryDataMismatch),
    }

    // 4. At least one witness.
    let witnesses = tx.witnesses().vkey_witnesses();
    if witnesses.is_empty() {
        return Err(TransactionError::MissingWitness);
    }

    // 5. Signatures over the body hash.
    let message = frozen.hash().as_bytes();
    for witness in witnesses {
        if !witness.vkey.verify(message, &witness.signature) {
            return Err(TransactionError::InvalidSignature {
                vkey: witness.vkey.to_hex(),
            });
        }
    }

    // 6. Every input owner is among the witness keys.
    for input in body.inputs() {
        if !witnesses.iter().any(|w| w.vkey.hash() == input.owner) {
            return Err(TransactionError::UnauthorizedInput {
                tx_hash: input.tx_hash.to_hex(),
                index: input.index,
            });
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
