use idv_store::{StoreError, VendorError};
use idv_types::ProfileId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("unknown session attribute: {0}")]
    UnknownAttribute(String),

    #[error("invalid value for session attribute {attribute}: {reason}")]
    InvalidAttributeValue { attribute: String, reason: String },

    #[error("profile {0} was already created for this session")]
    ProfileAlreadyCreated(ProfileId),

    #[error("no applicant has been assembled in this session")]
    MissingApplicant,

    #[error("session has no profile")]
    NoProfile,

    #[error("profile creation failed: {0}")]
    ProfileCreationFailed(#[source] StoreError),

    #[error("profile lookup failed: {0}")]
    ProfileLookupFailed(#[source] StoreError),

    #[error("PII could not be cached or relocated: {0}")]
    PiiRelocationFailed(#[source] StoreError),

    #[error("in-person enrollment could not be linked to the profile: {0}")]
    EnrollmentAssociationFailed(#[source] StoreError),

    #[error("{vendor} call failed: {source}")]
    VendorCallFailed {
        vendor: &'static str,
        #[source]
        source: VendorError,
    },

    #[error("encryption error: {0}")]
    Crypto(#[from] idv_crypto::CryptoError),

    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),
}

impl SessionError {
    /// Whether the step can be retried as-is.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::VendorCallFailed { .. })
    }

    /// Whether the user must re-enter their password to recover.
    pub fn requires_reauthentication(&self) -> bool {
        matches!(self, Self::PiiRelocationFailed(_))
    }
}
