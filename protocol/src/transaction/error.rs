//! Errors raised while constructing and balancing a transaction.

use thiserror::Error;

use super::types::{Lovelace, ValueError};

/// The sender cannot cover the transfer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FundsError {
    /// The chain service reported no spendable outputs at the sender address.
    #[error("no spendable outputs at sender address")]
    NoSpendableOutputs,

    /// Inputs do not cover amount plus fee with a positive remainder.
    #[error("inputs total {available}, transfer needs more than {required}")]
    Shortfall { available: Lovelace, required: Lovelace },
}

/// Everything that can go wrong between "here are the inputs" and "here is a
/// frozen, balanced body".
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error(transparent)]
    Funds(#[from] FundsError),

    #[error("output of {value} is below the ledger minimum of {minimum}")]
    OutputBelowMinimum { value: Lovelace, minimum: Lovelace },

    #[error("signed transaction would be {size} bytes, protocol maximum is {max}")]
    TooLarge { size: u64, max: u64 },

    #[error("transaction must have at least one input")]
    NoInputs,

    #[error("transaction must have at least one output")]
    NoOutputs,

    #[error("unbalanced transaction: inputs {inputs}, outputs {outputs}, fee {fee}")]
    Unbalanced {
        inputs: Lovelace,
        outputs: Lovelace,
        fee: Lovelace,
    },

    #[error("fee did not settle after {iterations} iterations")]
    FeeDidNotConverge { iterations: usize },

    #[error(transparent)]
    Value(#[from] ValueError),
}
