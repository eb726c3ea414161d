//! Unified error type for distlog.
//!
//! Wraps the layer errors so callers of the facade handle a single type.

use thiserror::Error;

/// All distlog errors.
#[derive(Debug, Error)]
pub enum Error {
    /// Error raised by the log, capture or queue layers
    #[error(transparent)]
    Core(#[from] distlog_core::Error),

    /// Invalid or unreadable configuration
    #[error("config error: {0}")]
    Config(String),

    /// I/O error outside the store (reading a config file)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for distlog operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Check if this is a not-found error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Core(e) if e.is_not_found())
    }

    /// Check if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Core(e) => e.is_retryable(),
            Error::Io(_) => true,
            Error::Config(_) => false,
        }
    }
}

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Error::Config(e.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(e: toml::ser::Error) -> Self {
        Error::Config(e.to_string())
    }
}
