//! Secret values that must not leak through `Debug` or linger in memory.

use serde::{Deserialize, Serialize};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::TypeError;

/// The user's account password, used only to derive the PII encryption key.
///
/// This type intentionally does not implement `Serialize` or `Clone`.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct Password(String);

impl Password {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(<redacted>)")
    }
}

/// One-time recovery secret issued with a new profile.
///
/// Rendered as four dash-separated groups of four Crockford base32 characters.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PersonalKey(String);

impl PersonalKey {
    pub const GROUPS: usize = 4;
    pub const GROUP_LEN: usize = 4;

    pub fn parse(raw: &str) -> Result<Self, TypeError> {
        let normalized = raw.trim().to_ascii_uppercase();
        let groups: Vec<&str> = normalized.split('-').collect();
        let valid = groups.len() == Self::GROUPS
            && groups.iter().all(|g| {
                g.len() == Self::GROUP_LEN && g.bytes().all(|b| b.is_ascii_alphanumeric())
            });
        if !valid {
            return Err(TypeError::InvalidPersonalKey);
        }
        Ok(Self(normalized))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for PersonalKey {
    type Error = TypeError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Self::parse(&raw)
    }
}

impl From<PersonalKey> for String {
    fn from(key: PersonalKey) -> Self {
        key.0.clone()
    }
}

impl fmt::Debug for PersonalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PersonalKey(<redacted>)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn personal_key_parse_normalizes_case() {
        let key = PersonalKey::parse("abcd-1234-efgh-5678").unwrap();
        assert_eq!(key.expose(), "ABCD-1234-EFGH-5678");
    }

    #[test]
    fn personal_key_rejects_wrong_shape() {
        assert!(PersonalKey::parse("ABCD-1234-EFGH").is_err());
        assert!(PersonalKey::parse("ABCD-1234-EFGH-56789").is_err());
        assert!(PersonalKey::parse("ABCD-12!4-EFGH-5678").is_err());
    }

    #[test]
    fn secrets_are_redacted_in_debug() {
        let key = PersonalKey::parse("ABCD-1234-EFGH-5678").unwrap();
        assert!(!format!("{key:?}").contains("ABCD"));
        assert!(!format!("{:?}", Password::new("hunter2")).contains("hunter2"));
    }
}
