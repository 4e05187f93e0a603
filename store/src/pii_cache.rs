//! Encrypted PII cache trait.

use crate::profile::Profile;
use crate::StoreError;
use idv_types::{CacheToken, Password, Pii, ProfileId, UserId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Decrypted PII staged in the session until it is relocated into the
/// durable encrypted cache.
///
/// Holds JSON-encoded [`Pii`]. `Debug` is redacted.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StagedPii(String);

impl StagedPii {
    pub fn from_pii(pii: &Pii) -> Result<Self, StoreError> {
        serde_json::to_string(pii)
            .map(Self)
            .map_err(|e| StoreError::Serialization(e.to_string()))
    }

    pub fn to_pii(&self) -> Result<Pii, StoreError> {
        serde_json::from_str(&self.0).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    pub fn as_json(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for StagedPii {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("StagedPii(<redacted>)")
    }
}

/// Trait for the user's encrypted PII cache.
pub trait PiiCache {
    /// Unseal the profile's PII with the user's password and return the
    /// decrypted payload to stage in the session.
    ///
    /// `pii` is what the caller believes was sealed; implementations reject a
    /// mismatch rather than staging stale data.
    fn save(&self, password: &Password, profile: &Profile, pii: &Pii)
        -> Result<StagedPii, StoreError>;

    /// Persist a staged payload into the durable cache, keyed by profile.
    fn save_decrypted(
        &self,
        user: &UserId,
        profile: ProfileId,
        staged: &StagedPii,
    ) -> Result<(), StoreError>;

    /// Resolve a cache reference held by the session.
    fn fetch(&self, user: &UserId, token: &CacheToken) -> Result<Pii, StoreError>;

    /// Whether the durable cache holds PII for this user.
    fn exists_in_session(&self, user: &UserId) -> Result<bool, StoreError>;
}
