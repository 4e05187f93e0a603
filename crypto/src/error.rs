use thiserror::Error;

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("key derivation failed: {0}")]
    KeyDerivation(String),

    #[error("encryption failed: {0}")]
    Encryption(String),

    #[error("decryption failed: wrong password or corrupted data")]
    Decryption,

    #[error("unsupported envelope version: {0}")]
    UnsupportedVersion(u32),

    #[error("malformed envelope: {0}")]
    Malformed(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}
