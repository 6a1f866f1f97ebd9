//! Error types and error handling for the client
//!
//! Failures fall into three buckets: transport failures (no usable response),
//! server-reported failures (a response with a structured error body), and
//! local persistence failures. Server errors carry the backend's `detail`
//! message when one is present so callers can show it verbatim.

use thiserror::Error;

use crate::session::PersistenceError;

/// Client-level error types
///
/// Every remote call resolves to one of these. Session and store operations
/// wrap them in [`OperationError`] to attach the user-facing message.
#[derive(Error, Debug)]
pub enum ClientError {
    /// Request never produced a usable response (connect, timeout, I/O)
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("API error (HTTP {status}): {}", .detail.as_deref().unwrap_or("no detail"))]
    Api {
        /// HTTP status code
        status: u16,
        /// The `detail` field of the error body, if it could be extracted
        detail: Option<String>,
    },

    /// Response body did not match the expected shape
    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// Decoded entity failed domain validation
    #[error("Invalid entity from server: {0}")]
    InvalidEntity(String),

    /// The owning store or session was torn down while the call was in flight
    #[error("Request cancelled")]
    Cancelled,

    /// Error reading or writing persisted session state
    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    /// Internal error (catch-all for unexpected failures)
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl ClientError {
    /// Derive the single user-facing message for this failure
    ///
    /// Uses the server's `detail` when one was reported, otherwise the
    /// operation-specific fallback. The same string is stored in the owning
    /// store's `error` field and carried by the returned [`OperationError`].
    pub fn detail_or(&self, fallback: &str) -> String {
        match self {
            ClientError::Api {
                detail: Some(detail),
                ..
            } => detail.clone(),
            _ => fallback.to_string(),
        }
    }

    /// True if this error is a cancellation rather than a real failure
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ClientError::Cancelled)
    }
}

/// A failed session or store operation
///
/// `message` is exactly the string placed in the owning store's `error`
/// field, so callers handling the rejection and UI reading the field always
/// see the same text.
#[derive(Error, Debug)]
#[error("{message}")]
pub struct OperationError {
    /// User-facing message derived from the underlying failure
    pub message: String,
    /// The underlying client error
    #[source]
    pub source: ClientError,
}

impl OperationError {
    /// Wrap a client error with its derived user-facing message
    pub fn new(source: ClientError, fallback: &str) -> Self {
        Self {
            message: source.detail_or(fallback),
            source,
        }
    }
}
