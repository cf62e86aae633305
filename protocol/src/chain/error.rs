//! Error types for chain service calls.

use thiserror::Error;

use crate::transaction::types::ValueError;

/// Errors that can occur when talking to the chain query service.
#[derive(Debug, Error)]
pub enum ChainQueryError {
    /// The request never produced a response (DNS, TLS, connection reset...).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("{endpoint} returned status {status}: {body}")]
    Status {
        endpoint: String,
        status: u16,
        body: String,
    },

    /// The response parsed but carried values we refuse to build on.
    #[error("malformed response from {endpoint}: {source}")]
    MalformedResponse {
        endpoint: String,
        #[source]
        source: ValueError,
    },

    /// A field the signer depends on was absent.
    #[error("{endpoint} response is missing {field}")]
    MissingField {
        endpoint: String,
        field: &'static str,
    },
}
