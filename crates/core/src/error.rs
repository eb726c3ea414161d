//! Error types shared by the distlog crates

use thiserror::Error;

use crate::types::EntryId;

/// Errors raised by stores, the capture interceptor and the queue
#[derive(Debug, Error)]
pub enum Error {
    /// Log entry does not exist (deleted by another consumer, or never written)
    #[error("log entry {0} not found")]
    NotFound(EntryId),

    /// Caller passed something malformed
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Backing store refused or failed the operation
    #[error("storage error: {0}")]
    Storage(String),

    /// I/O error from a file-backed store
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Encoding or decoding failed
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Persisted data failed validation
    #[error("corruption: {0}")]
    Corruption(String),

    /// Bug or invariant violation
    #[error("internal error: {0}")]
    Internal(String),
}

/// Result type for distlog operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Check if this is a not-found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }

    /// Check if a later attempt may succeed without intervention
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Storage(_) | Error::Io(_))
    }
}

impl From<bincode::Error> for Error {
    fn from(e: bincode::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
