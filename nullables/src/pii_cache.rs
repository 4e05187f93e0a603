//! Nullable PII cache: in-memory, with real decryption.

use idv_crypto::decrypt_pii;
use idv_store::{PiiCache, Profile, StagedPii, StoreError};
use idv_types::{CacheToken, Password, Pii, ProfileId, UserId};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

/// An in-memory PII cache.
///
/// `save` really decrypts the profile's envelope, so a wrong password fails
/// the way it would in production.
pub struct NullPiiCache {
    durable: Mutex<HashMap<UserId, (ProfileId, Pii)>>,
    references: Mutex<HashMap<(UserId, CacheToken), Pii>>,
    durable_writes: AtomicUsize,
    fail_saves: AtomicBool,
    fail_durable_writes: AtomicBool,
}

impl NullPiiCache {
    pub fn new() -> Self {
        Self {
            durable: Mutex::new(HashMap::new()),
            references: Mutex::new(HashMap::new()),
            durable_writes: AtomicUsize::new(0),
            fail_saves: AtomicBool::new(false),
            fail_durable_writes: AtomicBool::new(false),
        }
    }

    /// Seed a payload reachable through `token`, as if cached by an earlier request.
    pub fn insert_reference(&self, user: UserId, token: CacheToken, profile: ProfileId, pii: Pii) {
        self.references
            .lock()
            .unwrap()
            .insert((user, token), pii.clone());
        self.durable.lock().unwrap().insert(user, (profile, pii));
    }

    /// Forget everything cached for `user`, as after session expiry.
    pub fn evict(&self, user: &UserId) {
        self.durable.lock().unwrap().remove(user);
        self.references.lock().unwrap().retain(|(u, _), _| u != user);
    }

    /// Number of successful `save_decrypted` calls.
    pub fn durable_write_count(&self) -> usize {
        self.durable_writes.load(Ordering::SeqCst)
    }

    pub fn durable_entry(&self, user: &UserId) -> Option<(ProfileId, Pii)> {
        self.durable.lock().unwrap().get(user).cloned()
    }

    pub fn fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    pub fn fail_durable_writes(&self, fail: bool) {
        self.fail_durable_writes.store(fail, Ordering::SeqCst);
    }
}

impl Default for NullPiiCache {
    fn default() -> Self {
        Self::new()
    }
}

impl PiiCache for NullPiiCache {
    fn save(
        &self,
        password: &Password,
        profile: &Profile,
        pii: &Pii,
    ) -> Result<StagedPii, StoreError> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("injected cache failure".to_string()));
        }
        let sealed = decrypt_pii(&profile.encrypted_pii, password)?;
        if &sealed != pii {
            return Err(StoreError::Backend(
                "sealed PII does not match the session".to_string(),
            ));
        }
        StagedPii::from_pii(&sealed)
    }

    fn save_decrypted(
        &self,
        user: &UserId,
        profile: ProfileId,
        staged: &StagedPii,
    ) -> Result<(), StoreError> {
        if self.fail_durable_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("injected cache failure".to_string()));
        }
        let pii = staged.to_pii()?;
        self.durable.lock().unwrap().insert(*user, (profile, pii));
        self.durable_writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn fetch(&self, user: &UserId, token: &CacheToken) -> Result<Pii, StoreError> {
        self.references
            .lock()
            .unwrap()
            .get(&(*user, token.clone()))
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("pii reference for {user}")))
    }

    fn exists_in_session(&self, user: &UserId) -> Result<bool, StoreError> {
        Ok(self.durable.lock().unwrap().contains_key(user))
    }
}
