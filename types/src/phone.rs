//! Phone number types.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::TypeError;

/// A phone number in E.164 form: `+` followed by 8 to 15 digits.
///
/// Two raw inputs that denote the same line normalize to equal values, which
/// is what deduplication of rejected numbers relies on.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct E164Phone(String);

impl E164Phone {
    pub const MIN_DIGITS: usize = 8;
    pub const MAX_DIGITS: usize = 15;

    pub fn parse(raw: &str) -> Result<Self, TypeError> {
        let digits = raw
            .strip_prefix('+')
            .ok_or_else(|| TypeError::InvalidPhone(raw.to_string()))?;
        let valid = (Self::MIN_DIGITS..=Self::MAX_DIGITS).contains(&digits.len())
            && digits.bytes().all(|b| b.is_ascii_digit())
            && !digits.starts_with('0');
        if !valid {
            return Err(TypeError::InvalidPhone(raw.to_string()));
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for E164Phone {
    type Error = TypeError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Self::parse(&raw)
    }
}

impl From<E164Phone> for String {
    fn from(phone: E164Phone) -> Self {
        phone.0
    }
}

impl fmt::Display for E164Phone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How a phone one-time code is delivered.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OtpDeliveryMethod {
    #[default]
    Sms,
    Voice,
}

/// The last submission of the phone step, replayed when the user goes back.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhoneStepParams {
    pub phone: String,
    #[serde(default)]
    pub otp_delivery_preference: OtpDeliveryMethod,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_well_formed_numbers() {
        assert!(E164Phone::parse("+12025550123").is_ok());
        assert!(E164Phone::parse("+442071838750").is_ok());
    }

    #[test]
    fn rejects_malformed_numbers() {
        assert!(E164Phone::parse("2025550123").is_err());
        assert!(E164Phone::parse("+1-202-555-0123").is_err());
        assert!(E164Phone::parse("+0123456789").is_err());
        assert!(E164Phone::parse("+1234").is_err());
    }

    #[test]
    fn deserialization_validates() {
        assert!(serde_json::from_str::<E164Phone>("\"+12025550123\"").is_ok());
        assert!(serde_json::from_str::<E164Phone>("\"202-555-0123\"").is_err());
    }
}
