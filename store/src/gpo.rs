//! Mailed confirmation-code ("GPO") generator trait.

use crate::profile::Profile;
use crate::VendorError;
use idv_types::{Pii, ServiceProvider};
use std::fmt;

/// One-time code printed on the letter mailed to the applicant.
#[derive(Clone, PartialEq, Eq)]
pub struct GpoOtp(String);

impl GpoOtp {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for GpoOtp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("GpoOtp(<redacted>)")
    }
}

/// Generates and records a mailed confirmation code for a pending profile.
pub trait GpoConfirmationMaker {
    fn generate(
        &self,
        pii: &Pii,
        service_provider: Option<&ServiceProvider>,
        profile: &Profile,
    ) -> Result<GpoOtp, VendorError>;
}
