//! Error types for the REST client.
//!
//! # Design
//! One variant per way a call can fail. Nothing is retried or recovered
//! locally: every variant reaches the caller of `get`/`post`/`put` as-is.

/// Errors returned by `RestClient` operations.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The cancellation token fired before the call completed.
    #[error("request cancelled")]
    Cancelled,

    /// The server returned a non-2xx status. The body is kept verbatim and was
    /// not decoded.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// The response body was not valid JSON, or had no `data` field of the
    /// expected shape.
    #[error("decode failed: {0}")]
    Decode(String),

    /// Connection, DNS, TLS, timeout, or body read failure from the transport.
    #[error("transport failed: {0}")]
    Transport(String),

    /// The request body could not be encoded as JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),
}

impl ApiError {
    /// Status code for `Http` errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}
