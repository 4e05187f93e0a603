//! Phone-number normalizer trait.

use idv_types::{E164Phone, TypeError};

/// Parses user-entered phone numbers into canonical E.164 form.
pub trait PhoneNormalizer {
    fn parse(&self, raw: &str) -> Result<E164Phone, TypeError>;
}
