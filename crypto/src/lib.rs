//! Cryptographic primitives for IdV sessions.
//!
//! - **Argon2id + AES-256-GCM** for encrypting PII under a password-derived key
//! - **Blake2b** for idempotency-key derivation
//! - Personal-key generation from the OS random source

pub mod error;
pub mod hash;
pub mod personal_key;
pub mod pii;

pub use error::CryptoError;
pub use hash::{blake2b_256, blake2b_256_multi, derive_idempotency_key};
pub use personal_key::generate_personal_key;
pub use pii::{decrypt_pii, encrypt_pii, EncryptedPii, KdfParams};
