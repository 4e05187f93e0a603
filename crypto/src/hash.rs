//! Blake2b hashing for idempotency keys.

use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use idv_types::{IdempotencyKey, SessionId, UserId};
use uuid::Uuid;

type Blake2b256 = Blake2b<U32>;

/// Domain separator so idempotency keys never collide with other hash uses.
const IDEMPOTENCY_DOMAIN: &[u8] = b"idv-profile-create";

/// Compute a 256-bit Blake2b hash of arbitrary data.
pub fn blake2b_256(data: &[u8]) -> [u8; 32] {
    blake2b_256_multi(&[data])
}

/// Hash multiple byte slices in sequence (avoids concatenation allocation).
pub fn blake2b_256_multi(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Blake2b256::new();
    for part in parts {
        hasher.update(part);
    }
    let result = hasher.finalize();
    let mut output = [0u8; 32];
    output.copy_from_slice(&result);
    output
}

/// Derive the profile-creation idempotency key for a browser session.
///
/// `flow` is the nonce of the current IdV attempt; a restart mints a new one
/// so the same browser session can finalize again.
pub fn derive_idempotency_key(
    session: &SessionId,
    flow: Option<&Uuid>,
    user: &UserId,
) -> IdempotencyKey {
    let flow = flow.map(|nonce| nonce.as_bytes().as_slice()).unwrap_or_default();
    let digest = blake2b_256_multi(&[
        IDEMPOTENCY_DOMAIN,
        session.as_str().as_bytes(),
        b"\0",
        flow,
        b"\0",
        user.as_uuid().as_bytes(),
    ]);
    IdempotencyKey::new(hex::encode(digest))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blake2b_multi_equivalent() {
        let single = blake2b_256(b"helloworld");
        let multi = blake2b_256_multi(&[b"hello", b"world"]);
        assert_eq!(single, multi);
    }

    #[test]
    fn idempotency_key_is_deterministic() {
        let user = UserId::random();
        let session = SessionId::new("sess-1");
        let flow = Uuid::new_v4();
        assert_eq!(
            derive_idempotency_key(&session, Some(&flow), &user),
            derive_idempotency_key(&session, Some(&flow), &user)
        );
    }

    #[test]
    fn idempotency_key_differs_per_session_and_user() {
        let user = UserId::random();
        let a = derive_idempotency_key(&SessionId::new("sess-1"), None, &user);
        let b = derive_idempotency_key(&SessionId::new("sess-2"), None, &user);
        let c = derive_idempotency_key(&SessionId::new("sess-1"), None, &UserId::random());
        assert_ne!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.as_str().len(), 64);
    }

    #[test]
    fn new_flow_nonce_gives_new_key() {
        let user = UserId::random();
        let session = SessionId::new("sess-1");
        let first = derive_idempotency_key(&session, None, &user);
        let restarted = derive_idempotency_key(&session, Some(&Uuid::new_v4()), &user);
        let again = derive_idempotency_key(&session, Some(&Uuid::new_v4()), &user);
        assert_ne!(first, restarted);
        assert_ne!(restarted, again);
    }
}
