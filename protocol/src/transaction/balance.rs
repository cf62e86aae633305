//! Fee and change resolution.
//!
//! The fee depends on the size of the signed transaction, and the size
//! depends on the fee and change values written into it. The balancer
//! resolves that loop by iteration:
//!
//! ```text
//! fee = 0
//! loop:
//!     change   = inputs - amount - fee          (must stay positive)
//!     size     = signed size of the candidate   (placeholder witness)
//!     required = min_fee_a * size + min_fee_b
//!     if required <= fee: done
//!     fee = required
//! ```
//!
//! `fee` here is the base fee. Dust folded into the paid fee is tracked
//! separately and never satisfies the size-driven requirement.
//!
//! The fee only grows, and each step changes the size by a few bytes at
//! most, so this settles in two or three rounds. [`MAX_FEE_ITERATIONS`]
//! bounds it anyway.
//!
//! Change below the minimum-UTXO value cannot be paid out; it is added to
//! the fee and no change output is emitted.

use super::address::Address;
use super::builder::assemble_body;
use super::error::{BuildError, FundsError};
use super::inputs::CollectedInputs;
use super::metadata::AuxiliaryData;
use super::outputs::{min_utxo_value, TransactionOutput};
use super::signing::estimate_signed_size;
use super::types::{Lovelace, ValueError};
use crate::chain::{ChainParameters, ChainTip};
use crate::config::{MAX_FEE_ITERATIONS, TTL_WINDOW_SLOTS};

/// Linear fee for a transaction of `size` bytes: `min_fee_a * size + min_fee_b`.
pub fn min_fee(params: &ChainParameters, size: usize) -> Result<Lovelace, ValueError> {
    let variable = params
        .min_fee_a
        .checked_mul(size as u64)
        .ok_or(ValueError::Overflow)?;
    Lovelace::new(variable).checked_add(params.min_fee_b)
}

/// Last valid slot for a transaction built at `tip`.
pub fn ttl_for(tip: ChainTip) -> Result<u64, ValueError> {
    tip.slot
        .checked_add(TTL_WINDOW_SLOTS)
        .ok_or(ValueError::Overflow)
}

/// The settled fee, change and validity window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeeResolution {
    /// Fee actually paid, including any folded dust.
    pub fee: Lovelace,
    /// Change back to the sender, `None` when it was folded into the fee.
    pub change: Option<TransactionOutput>,
    /// Dust added to the fee because it was below the minimum-UTXO value.
    pub folded_change: Lovelace,
    pub ttl: u64,
    /// Size in bytes of the signed transaction.
    pub signed_size: usize,
}

/// Everything the balancer needs to know about the transfer.
#[derive(Debug, Clone, Copy)]
pub struct BalanceRequest<'a> {
    pub inputs: &'a CollectedInputs,
    pub recipient: &'a TransactionOutput,
    pub change_address: &'a Address,
    pub auxiliary_data: Option<&'a AuxiliaryData>,
    pub params: &'a ChainParameters,
    pub tip: ChainTip,
}

struct Candidate {
    /// Base fee plus folded dust.
    fee: Lovelace,
    change: Option<TransactionOutput>,
    folded_change: Lovelace,
}

impl BalanceRequest<'_> {
    /// Splits the surplus for a provisional `fee` into change or folded dust.
    fn candidate(&self, fee: Lovelace) -> Result<Candidate, BuildError> {
        let amount = self.recipient.value;
        let required = amount.checked_add(fee)?;
        let change = self
            .inputs
            .total
            .checked_sub(required)
            .filter(|change| !change.is_zero())
            .ok_or(FundsError::Shortfall {
                available: self.inputs.total,
                required,
            })?;

        let output = TransactionOutput::new(self.change_address.clone(), change);
        let minimum = min_utxo_value(&output, self.params.coins_per_utxo_byte)?;
        if change < minimum {
            return Ok(Candidate {
                fee: fee.checked_add(change)?,
                change: None,
                folded_change: change,
            });
        }
        Ok(Candidate {
            fee,
            change: Some(output),
            folded_change: Lovelace::ZERO,
        })
    }

    fn measure(&self, candidate: &Candidate, ttl: u64) -> Result<usize, BuildError> {
        let frozen = assemble_body(
            &self.inputs.inputs,
            self.recipient,
            candidate.change.as_ref(),
            candidate.fee,
            ttl,
            self.auxiliary_data.map(AuxiliaryData::hash),
        )?;
        Ok(estimate_signed_size(&frozen, self.auxiliary_data))
    }
}

/// Resolves fee and change for a single-recipient transfer.
///
/// # Errors
///
/// - [`BuildError::Funds`] when the inputs cannot cover amount plus fee with
///   a positive remainder.
/// - [`BuildError::TooLarge`] when the signed size exceeds `max_tx_size`.
/// - [`BuildError::FeeDidNotConverge`] when the loop runs out of rounds.
pub fn balance(request: &BalanceRequest<'_>) -> Result<FeeResolution, BuildError> {
    let ttl = ttl_for(request.tip)?;
    let mut fee = Lovelace::ZERO;

    for round in 0..MAX_FEE_ITERATIONS {
        let candidate = request.candidate(fee)?;
        let size = request.measure(&candidate, ttl)?;
        let required = min_fee(request.params, size)?;
        tracing::trace!(
            round,
            size,
            fee = candidate.fee.as_u64(),
            required = required.as_u64(),
            "fee round"
        );

        // Folded dust does not count towards the required fee.
        if required <= fee {
            if size as u64 > request.params.max_tx_size {
                return Err(BuildError::TooLarge {
                    size: size as u64,
                    max: request.params.max_tx_size,
                });
            }
            return Ok(FeeResolution {
                fee: candidate.fee,
                change: candidate.change,
                folded_change: candidate.folded_change,
                ttl,
                signed_size: size,
            });
        }
        fee = required;
    }

    Err(BuildError::FeeDidNotConverge {
        iterations: MAX_FEE_ITERATIONS,
    })
}
