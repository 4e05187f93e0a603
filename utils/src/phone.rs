//! Phone-number normalization for North American Numbering Plan defaults.

use idv_store::PhoneNormalizer;
use idv_types::{E164Phone, TypeError};

/// Normalizes user-entered numbers to E.164.
///
/// Numbers written with a leading `+` or `00` are taken as international.
/// Anything else is assumed to be national to `default_country_code`
/// unless it already starts with that code and is longer than a national number.
#[derive(Clone, Debug)]
pub struct NanpPhoneNormalizer {
    default_country_code: String,
}

/// Digits in a NANP national number (area code + subscriber).
const NATIONAL_LEN: usize = 10;

impl NanpPhoneNormalizer {
    pub fn new(default_country_code: impl Into<String>) -> Self {
        Self {
            default_country_code: default_country_code.into(),
        }
    }
}

impl Default for NanpPhoneNormalizer {
    fn default() -> Self {
        Self::new("1")
    }
}

impl PhoneNormalizer for NanpPhoneNormalizer {
    fn parse(&self, raw: &str) -> Result<E164Phone, TypeError> {
        let trimmed = raw.trim();
        let invalid = || TypeError::InvalidPhone(raw.to_string());

        let (international, body) = if let Some(rest) = trimmed.strip_prefix('+') {
            (true, rest)
        } else if let Some(rest) = trimmed.strip_prefix("00") {
            (true, rest)
        } else {
            (false, trimmed)
        };

        let mut digits = String::with_capacity(body.len());
        for c in body.chars() {
            match c {
                '0'..='9' => digits.push(c),
                ' ' | '-' | '(' | ')' | '.' => {}
                _ => return Err(invalid()),
            }
        }
        if digits.is_empty() {
            return Err(invalid());
        }

        let candidate = if international
            || (digits.len() > NATIONAL_LEN && digits.starts_with(&self.default_country_code))
        {
            format!("+{digits}")
        } else {
            format!("+{}{digits}", self.default_country_code)
        };
        E164Phone::parse(&candidate).map_err(|_| invalid())
    }
}
