//! Validation errors for the fundamental types.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid E.164 phone number: {0}")]
    InvalidPhone(String),

    #[error("invalid personal key format")]
    InvalidPersonalKey,

    #[error("invalid cache token: {0}")]
    InvalidCacheToken(String),
}
