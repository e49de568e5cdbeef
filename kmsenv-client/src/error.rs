//! Key client and envelope error types.

use kmsenv_crypto::CryptoError;
use thiserror::Error;

/// Result type for key client and envelope operations.
pub type KmsResult<T> = Result<T, KmsError>;

/// Errors that can occur while generating, wrapping or unwrapping keys.
///
/// None of these are retried internally. Only the service kinds
/// ([`KmsError::Service`] and [`KmsError::Http`]) are transient; see
/// [`KmsError::is_retryable`].
#[derive(Debug, Error)]
pub enum KmsError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("malformed envelope: {0}")]
    Format(String),

    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),

    #[error("key service request failed: {0}")]
    Service(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl KmsError {
    /// Returns true for failures a caller may reasonably retry.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Service(_) | Self::Http(_))
    }
}
