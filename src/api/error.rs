//! Error types surfaced by the API transport.

use thiserror::Error;

/// Failure of a single Codacy API call.
#[derive(Error, Debug)]
pub(crate) enum ApiError {
    /// The service answered with a non-2xx status.
    #[error("API returned {status}: {snippet}")]
    Status { status: u16, snippet: String },

    /// The requested entity does not exist.
    #[error("{0} not found")]
    NotFound(String),

    /// The request could not be sent or its response could not be read.
    #[error("executing request: {0}")]
    Request(String),

    #[error("encoding request body: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("decoding response: {0}")]
    Decode(#[from] serde_json::Error),

    /// A response body was required but the service sent none.
    #[error("empty response body")]
    EmptyBody,
}

impl ApiError {
    /// HTTP status carried by the error, if any.
    pub(crate) fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
