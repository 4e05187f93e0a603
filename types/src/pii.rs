//! Applicant and PII records.
//!
//! `Pii` deliberately has a redacting `Debug` impl: it must never end up in
//! log lines or panic messages.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::TypeError;

/// Personal data collected during the flow (name, DOB, address, SSN, phone).
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Pii {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub middle_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    /// Date of birth, ISO-8601 (`YYYY-MM-DD`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dob: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address1: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address2: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zipcode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_id_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_id_jurisdiction: Option<String>,
}

/// The accumulated identity data submitted for resolution.
pub type Applicant = Pii;

impl Pii {
    /// True when no field has been filled in.
    pub fn is_empty(&self) -> bool {
        self == &Pii::default()
    }

    /// Field names that carry a value, for redacted diagnostics.
    pub fn present_fields(&self) -> Vec<&'static str> {
        let fields: [(&'static str, bool); 13] = [
            ("first_name", self.first_name.is_some()),
            ("middle_name", self.middle_name.is_some()),
            ("last_name", self.last_name.is_some()),
            ("dob", self.dob.is_some()),
            ("ssn", self.ssn.is_some()),
            ("address1", self.address1.is_some()),
            ("address2", self.address2.is_some()),
            ("city", self.city.is_some()),
            ("state", self.state.is_some()),
            ("zipcode", self.zipcode.is_some()),
            ("phone", self.phone.is_some()),
            ("state_id_number", self.state_id_number.is_some()),
            ("state_id_jurisdiction", self.state_id_jurisdiction.is_some()),
        ];
        fields
            .into_iter()
            .filter(|(_, present)| *present)
            .map(|(name, _)| name)
            .collect()
    }
}

impl fmt::Debug for Pii {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pii")
            .field("present", &self.present_fields())
            .finish_non_exhaustive()
    }
}

/// Opaque handle to a PII payload held by the encrypted PII cache.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CacheToken(String);

impl CacheToken {
    pub fn new(raw: impl Into<String>) -> Result<Self, TypeError> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(TypeError::InvalidCacheToken(raw));
        }
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// PII held by the session: either inline or a reference into the PII cache.
///
/// Serialized untagged, so a JSON string is a cache reference and a JSON
/// object is inline data. Resolve it explicitly at the point of use.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PiiPayload {
    CacheReference(CacheToken),
    Inline(Pii),
}

impl PiiPayload {
    pub fn inline(&self) -> Option<&Pii> {
        match self {
            Self::Inline(pii) => Some(pii),
            Self::CacheReference(_) => None,
        }
    }

    pub fn is_cache_reference(&self) -> bool {
        matches!(self, Self::CacheReference(_))
    }
}
