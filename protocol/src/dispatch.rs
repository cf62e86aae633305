//! Dispatch of a signed transaction: broadcast it, or write it to disk for
//! out-of-band submission. Either way exactly one attempt is made.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::chain::ChainQuery;
use crate::error::Error;
use crate::transaction::signing::SignedTransaction;
use crate::transaction::types::TransactionId;

/// What to do with the signed payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchMode {
    Submit,
    Persist { path: PathBuf },
}

/// What happened to the signed payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Accepted by the chain service, with the id it reported.
    Submitted(TransactionId),
    /// Written to this absolute path.
    Persisted(PathBuf),
}

impl fmt::Display for DispatchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchOutcome::Submitted(id) => write!(f, "transaction {id} successfully submitted"),
            DispatchOutcome::Persisted(path) => {
                write!(f, "transaction written to {}", path.display())
            }
        }
    }
}

/// Sends `tx` where `mode` says.
pub async fn dispatch<Q>(
    chain: &Q,
    tx: &SignedTransaction,
    mode: &DispatchMode,
) -> Result<DispatchOutcome, Error>
where
    Q: ChainQuery + ?Sized,
{
    let payload = tx.to_bytes();
    match mode {
        DispatchMode::Submit => {
            let id = chain.submit(&payload).await?;
            if id != tx.id() {
                tracing::warn!(
                    reported = %id,
                    computed = %tx.id(),
                    "chain service reported a different transaction id"
                );
            }
            tracing::info!(tx_id = %id, size = payload.len(), "transaction submitted");
            Ok(DispatchOutcome::Submitted(id))
        }
        DispatchMode::Persist { path } => {
            let path = persist(path, &payload).await?;
            tracing::info!(path = %path.display(), size = payload.len(), "transaction written");
            Ok(DispatchOutcome::Persisted(path))
        }
    }
}

/// Writes `payload` to `path`, replacing any existing file, and returns the
/// absolute path written.
pub async fn persist(path: &Path, payload: &[u8]) -> Result<PathBuf, Error> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map_err(|source| Error::Persistence {
                path: path.to_path_buf(),
                source,
            })?
            .join(path)
    };

    tokio::fs::write(&absolute, payload)
        .await
        .map_err(|source| Error::Persistence {
            path: absolute.clone(),
            source,
        })?;
    Ok(absolute)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn persist_writes_exact_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("tx.signed");
        let written = persist(&target, &[0x84, 0xa0]).await.unwrap();
        assert_eq!(written, target);
        assert_eq!(std::fs::read(&target).unwrap(), vec![0x84, 0xa0]);
    }

    #[tokio::test]
    async fn persist_into_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("missing").join("tx.signed");
        let err = persist(&target, &[0x80]).await.unwrap_err();
        match err {
            Error::Persistence { path, .. } => assert_eq!(path, target),
            other => panic!("expected persistence error, got {other:?}"),
        }
    }

    #[test]
    fn outcome_messages() {
        let submitted = DispatchOutcome::Submitted(TransactionId::new("abc123"));
        assert_eq!(submitted.to_string(), "transaction abc123 successfully submitted");
        let persisted = DispatchOutcome::Persisted(PathBuf::from("/tmp/tx.signed"));
        assert_eq!(persisted.to_string(), "transaction written to /tmp/tx.signed");
    }
}
