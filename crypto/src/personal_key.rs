//! Personal-key generation.

use idv_types::PersonalKey;
use rand::Rng;

/// Crockford base32 alphabet (no I, L, O, U).
const ALPHABET: &[u8; 32] = b"0123456789ABCDEFGHJKMNPQRSTVWXYZ";

/// Generate a fresh personal key from the thread-local CSPRNG.
pub fn generate_personal_key() -> PersonalKey {
    let mut rng = rand::thread_rng();
    let groups: Vec<String> = (0..PersonalKey::GROUPS)
        .map(|_| {
            (0..PersonalKey::GROUP_LEN)
                .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
                .collect()
        })
        .collect();
    PersonalKey::parse(&groups.join("-"))
        .unwrap_or_else(|_| unreachable!("generated keys always match the personal key shape"))
}
