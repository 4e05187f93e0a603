use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("key not found: {0}")]
    NotFound(String),

    #[error("duplicate key: {0}")]
    Duplicate(String),

    #[error("storage backend error: {0}")]
    Backend(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("encryption error: {0}")]
    Crypto(#[from] idv_crypto::CryptoError),
}

/// Failure of an out-of-process vendor call (mail codes, enrollment scheduling).
///
/// Always retryable from the caller's point of view.
#[derive(Debug, Error)]
pub enum VendorError {
    #[error("vendor unavailable: {0}")]
    Unavailable(String),

    #[error("vendor rejected the request: {0}")]
    Rejected(String),

    #[error("vendor call timed out")]
    Timeout,
}
