//! Phone-step state: vendor/user confirmation, the OTP session, and the list
//! of numbers the vendor already rejected.

use idv_store::PhoneNormalizer;
use idv_types::{E164Phone, OtpDeliveryMethod, Timestamp, TypeError};
use serde::{Deserialize, Serialize};

/// Combined vendor and user phone confirmation.
///
/// The two underlying attributes are not independent: a user confirmation
/// is only meaningful on top of a vendor confirmation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PhoneConfirmation {
    #[default]
    NotStarted,
    /// The address-verification vendor matched the phone to the applicant.
    VendorConfirmed,
    /// The vendor matched the phone and the user proved possession via OTP.
    UserConfirmed,
    /// The vendor did not match the phone.
    Rejected,
}

impl PhoneConfirmation {
    /// Value of the `vendor_phone_confirmation` attribute.
    pub fn vendor(self) -> Option<bool> {
        match self {
            Self::NotStarted => None,
            Self::VendorConfirmed | Self::UserConfirmed => Some(true),
            Self::Rejected => Some(false),
        }
    }

    /// Value of the `user_phone_confirmation` attribute.
    pub fn user(self) -> Option<bool> {
        match self {
            Self::UserConfirmed => Some(true),
            _ => None,
        }
    }

    /// Apply a new vendor result. Anything but a positive result drops the
    /// user-side confirmation along with it.
    pub fn with_vendor(self, confirmed: Option<bool>) -> Self {
        match confirmed {
            None => Self::NotStarted,
            Some(false) => Self::Rejected,
            Some(true) if self == Self::UserConfirmed => Self::UserConfirmed,
            Some(true) => Self::VendorConfirmed,
        }
    }

    /// Apply a new user result. Returns `None` when the transition is not
    /// allowed: a user confirmation without a vendor confirmation, or an
    /// explicit `false` (the user side is either confirmed or unset).
    pub fn with_user(self, confirmed: Option<bool>) -> Option<Self> {
        match (self, confirmed) {
            (Self::VendorConfirmed | Self::UserConfirmed, Some(true)) => Some(Self::UserConfirmed),
            (Self::UserConfirmed, None) => Some(Self::VendorConfirmed),
            (other, None) => Some(other),
            (_, Some(_)) => None,
        }
    }

    /// Both sides confirmed.
    pub fn is_confirmed(self) -> bool {
        self == Self::UserConfirmed
    }
}

/// An outstanding phone one-time-code exchange.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhoneOtpSession {
    pub phone: E164Phone,
    pub delivery_method: OtpDeliveryMethod,
    pub sent_at: Timestamp,
    /// Seconds the code stays valid after `sent_at`.
    pub ttl_secs: u64,
}

impl PhoneOtpSession {
    pub fn new(phone: E164Phone, delivery_method: OtpDeliveryMethod, ttl_secs: u64) -> Self {
        Self {
            phone,
            delivery_method,
            sent_at: Timestamp::now(),
            ttl_secs,
        }
    }

    pub fn is_expired(&self, now: Timestamp) -> bool {
        self.sent_at.has_expired(self.ttl_secs, now)
    }
}

/// Numbers the address-verification vendor already rejected, in E.164 form.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FailedPhoneNumbers(Vec<E164Phone>);

impl FailedPhoneNumbers {
    /// Normalize and record `raw`. Returns `Ok(false)` if the normalized
    /// number was already present.
    pub fn add(
        &mut self,
        raw: &str,
        normalizer: &impl PhoneNormalizer,
    ) -> Result<bool, TypeError> {
        let phone = normalizer.parse(raw)?;
        if self.0.contains(&phone) {
            return Ok(false);
        }
        self.0.push(phone);
        Ok(true)
    }

    pub fn contains(&self, phone: &E164Phone) -> bool {
        self.0.contains(phone)
    }

    pub fn as_slice(&self) -> &[E164Phone] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
