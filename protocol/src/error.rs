//! Top-level error taxonomy.
//!
//! Every failure in the signer is fatal and lands in one of five categories.
//! Module errors convert into [`Error`] with `?`; the category decides how
//! the failure is reported, never whether the run continues.

use std::path::PathBuf;
use thiserror::Error;

use crate::chain::ChainQueryError;
use crate::config::ConfigError;
use crate::crypto::keys::KeyError;
use crate::transaction::error::{BuildError, FundsError};
use crate::transaction::verification::TransactionError;

/// Failures while producing or checking the signature.
#[derive(Debug, Error)]
pub enum SigningError {
    #[error(transparent)]
    Key(#[from] KeyError),

    #[error("signed transaction failed verification: {0}")]
    Verification(#[from] TransactionError),
}

#[derive(Debug, Error)]
pub enum Error {
    /// Bad configuration, or a transfer request the ledger would refuse.
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigError),

    /// The sender cannot cover amount plus fee.
    #[error("insufficient funds: {0}")]
    InsufficientFunds(#[from] FundsError),

    /// The chain query service failed or rejected the request.
    #[error("network error: {0}")]
    Network(#[from] ChainQueryError),

    /// The signed transaction could not be written.
    #[error("failed to write {}: {source}", path.display())]
    Persistence {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("signing error: {0}")]
    Signing(#[from] SigningError),
}

impl Error {
    /// Short category name, used as a structured log field.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Configuration(_) => "configuration",
            Error::InsufficientFunds(_) => "insufficient_funds",
            Error::Network(_) => "network",
            Error::Persistence { .. } => "persistence",
            Error::Signing(_) => "signing",
        }
    }
}

impl From<KeyError> for Error {
    fn from(err: KeyError) -> Self {
        Error::Signing(SigningError::Key(err))
    }
}

impl From<TransactionError> for Error {
    fn from(err: TransactionError) -> Self {
        Error::Signing(SigningError::Verification(err))
    }
}

/// Funds problems keep their category; everything else about an unbuildable
/// transaction is a configuration problem (amount too small, too many inputs).
impl From<BuildError> for Error {
    fn from(err: BuildError) -> Self {
        match err {
            BuildError::Funds(funds) => Error::InsufficientFunds(funds),
            other => Error::Configuration(ConfigError::Transaction(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::types::Lovelace;

    #[test]
    fn build_errors_split_by_cause() {
        let funds: Error = BuildError::Funds(FundsError::NoSpendableOutputs).into();
        assert_eq!(funds.kind(), "insufficient_funds");

        let small: Error = BuildError::OutputBelowMinimum {
            value: Lovelace::new(1),
            minimum: Lovelace::new(900_000),
        }
        .into();
        assert_eq!(small.kind(), "configuration");
    }

    #[test]
    fn key_errors_are_signing_errors() {
        let err: Error = KeyError::InvalidSecretKey.into();
        assert_eq!(err.kind(), "signing");
        assert!(err.to_string().contains("invalid secret key"));
    }
}
