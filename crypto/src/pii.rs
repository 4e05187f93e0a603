//! Password-bound PII encryption.
//!
//! PII is sealed under a key derived from the user's password:
//! 1. Argon2id derives a 32-byte encryption key from the password + random salt
//! 2. AES-256-GCM encrypts the JSON-encoded PII with a random nonce
//! 3. The envelope records every parameter needed for later decryption

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use argon2::{Algorithm, Argon2, Params, Version};
use idv_types::{Password, Pii};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use crate::error::CryptoError;

const ENVELOPE_VERSION: u32 = 1;
const KEY_LEN: usize = 32;
/// Salt length in bytes.
const SALT_LEN: usize = 32;
/// AES-GCM nonce length in bytes (96 bits).
const NONCE_LEN: usize = 12;

/// Argon2id cost parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KdfParams {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for KdfParams {
    /// 64 MiB memory, 3 iterations, 1 lane.
    fn default() -> Self {
        Self {
            memory_kib: 65536,
            iterations: 3,
            parallelism: 1,
        }
    }
}

impl KdfParams {
    /// Minimal cost parameters for tests only.
    pub fn insecure_fast() -> Self {
        Self {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        }
    }
}

/// Encrypted PII envelope, stored on the profile record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedPii {
    pub version: u32,
    pub cipher: String,
    pub kdf: String,
    pub kdf_params: KdfParams,
    /// Hex-encoded salt.
    pub salt: String,
    /// Hex-encoded nonce.
    pub nonce: String,
    /// Hex-encoded ciphertext.
    pub ciphertext: String,
}

/// Encrypt PII under a password-derived key.
pub fn encrypt_pii(
    pii: &Pii,
    password: &Password,
    params: &KdfParams,
) -> Result<EncryptedPii, CryptoError> {
    let mut rng = rand::thread_rng();

    let mut salt = [0u8; SALT_LEN];
    rng.fill_bytes(&mut salt);

    let mut nonce_bytes = [0u8; NONCE_LEN];
    rng.fill_bytes(&mut nonce_bytes);

    let mut derived_key = derive_key(password, &salt, params)?;
    let cipher = Aes256Gcm::new_from_slice(&derived_key)
        .map_err(|e| CryptoError::Encryption(format!("AES key init failed: {e}")));
    derived_key.zeroize();
    let cipher = cipher?;

    let mut plaintext =
        serde_json::to_vec(pii).map_err(|e| CryptoError::Serialization(e.to_string()))?;
    let sealed = cipher
        .encrypt(Nonce::from_slice(&nonce_bytes), plaintext.as_ref())
        .map_err(|e| CryptoError::Encryption(e.to_string()));
    plaintext.zeroize();

    Ok(EncryptedPii {
        version: ENVELOPE_VERSION,
        cipher: "aes-256-gcm".to_string(),
        kdf: "argon2id".to_string(),
        kdf_params: *params,
        salt: hex::encode(salt),
        nonce: hex::encode(nonce_bytes),
        ciphertext: hex::encode(sealed?),
    })
}

/// Decrypt an envelope with the given password.
pub fn decrypt_pii(envelope: &EncryptedPii, password: &Password) -> Result<Pii, CryptoError> {
    if envelope.version != ENVELOPE_VERSION {
        return Err(CryptoError::UnsupportedVersion(envelope.version));
    }

    let salt = hex::decode(&envelope.salt)
        .map_err(|e| CryptoError::Malformed(format!("invalid salt hex: {e}")))?;
    let nonce_bytes = hex::decode(&envelope.nonce)
        .map_err(|e| CryptoError::Malformed(format!("invalid nonce hex: {e}")))?;
    let ciphertext = hex::decode(&envelope.ciphertext)
        .map_err(|e| CryptoError::Malformed(format!("invalid ciphertext hex: {e}")))?;

    if nonce_bytes.len() != NONCE_LEN {
        return Err(CryptoError::Malformed(format!(
            "invalid nonce length: expected {NONCE_LEN}, got {}",
            nonce_bytes.len()
        )));
    }

    let mut derived_key = derive_key(password, &salt, &envelope.kdf_params)?;
    let cipher = Aes256Gcm::new_from_slice(&derived_key)
        .map_err(|e| CryptoError::Encryption(format!("AES key init failed: {e}")));
    derived_key.zeroize();

    let mut plaintext = cipher?
        .decrypt(Nonce::from_slice(&nonce_bytes), ciphertext.as_ref())
        .map_err(|_| CryptoError::Decryption)?;
    let pii = serde_json::from_slice(&plaintext)
        .map_err(|e| CryptoError::Serialization(e.to_string()));
    plaintext.zeroize();
    pii
}

/// Derive a 32-byte key from a password and salt using Argon2id.
fn derive_key(
    password: &Password,
    salt: &[u8],
    params: &KdfParams,
) -> Result<[u8; KEY_LEN], CryptoError> {
    let argon_params = Params::new(
        params.memory_kib,
        params.iterations,
        params.parallelism,
        Some(KEY_LEN),
    )
    .map_err(|e| CryptoError::KeyDerivation(format!("Argon2 params error: {e}")))?;

    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, argon_params);

    let mut output = [0u8; KEY_LEN];
    argon2
        .hash_password_into(password.expose().as_bytes(), salt, &mut output)
        .map_err(|e| CryptoError::KeyDerivation(format!("Argon2 hashing failed: {e}")))?;

    Ok(output)
}
