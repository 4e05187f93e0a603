//! Nullable profile store: thread-safe in-memory storage for testing.

use crate::clock::NullClock;
use idv_store::{
    Activation, Profile, ProfileDraft, ProfileStore, ProfileWriteTxn, StoreError,
};
use idv_types::{IdempotencyKey, ProfileId, UserId};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;

/// An in-memory profile store with all-or-nothing write transactions.
///
/// Idempotency keys are unique across committed profiles. Stored profiles
/// never carry the personal key, matching a real backend.
pub struct NullProfileStore {
    clock: NullClock,
    profiles: Mutex<BTreeMap<ProfileId, Profile>>,
    next_id: AtomicU64,
    fail_creates: AtomicBool,
    fail_commits: AtomicBool,
}

impl NullProfileStore {
    pub fn new() -> Self {
        Self::with_clock(NullClock::default())
    }

    pub fn with_clock(clock: NullClock) -> Self {
        Self {
            clock,
            profiles: Mutex::new(BTreeMap::new()),
            next_id: AtomicU64::new(1),
            fail_creates: AtomicBool::new(false),
            fail_commits: AtomicBool::new(false),
        }
    }

    pub fn clock(&self) -> &NullClock {
        &self.clock
    }

    /// Make every subsequent `create_profile` fail.
    pub fn fail_creates(&self, fail: bool) {
        self.fail_creates.store(fail, Ordering::SeqCst);
    }

    /// Make every subsequent `commit` fail.
    pub fn fail_commits(&self, fail: bool) {
        self.fail_commits.store(fail, Ordering::SeqCst);
    }

    pub fn profile_count(&self) -> usize {
        self.profiles.lock().unwrap().len()
    }

    pub fn profiles_for(&self, user: &UserId) -> Vec<Profile> {
        self.profiles
            .lock()
            .unwrap()
            .values()
            .filter(|p| &p.user_id == user)
            .cloned()
            .collect()
    }

    fn key_taken(&self, key: &IdempotencyKey) -> bool {
        self.profiles
            .lock()
            .unwrap()
            .values()
            .any(|p| &p.idempotency_key == key)
    }
}

impl Default for NullProfileStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ProfileStore for NullProfileStore {
    type WriteTxn<'a> = NullWriteTxn<'a>;

    fn begin_write(&self) -> Result<Self::WriteTxn<'_>, StoreError> {
        Ok(NullWriteTxn {
            store: self,
            pending: Vec::new(),
        })
    }

    fn find(&self, id: ProfileId) -> Result<Option<Profile>, StoreError> {
        Ok(self.profiles.lock().unwrap().get(&id).cloned())
    }
}

/// Writes buffered until commit; dropped on rollback.
pub struct NullWriteTxn<'a> {
    store: &'a NullProfileStore,
    pending: Vec<Profile>,
}

impl NullWriteTxn<'_> {
    fn stage(&mut self, profile: &Profile) {
        let mut stored = profile.clone();
        stored.personal_key = None;
        match self.pending.iter_mut().find(|p| p.id == stored.id) {
            Some(existing) => *existing = stored,
            None => self.pending.push(stored),
        }
    }
}

impl ProfileWriteTxn for NullWriteTxn<'_> {
    fn create_profile(&mut self, draft: ProfileDraft) -> Result<Profile, StoreError> {
        if self.store.fail_creates.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("injected create failure".to_string()));
        }
        let key = &draft.idempotency_key;
        if self.store.key_taken(key) || self.pending.iter().any(|p| &p.idempotency_key == key) {
            return Err(StoreError::Duplicate(key.to_string()));
        }

        let id = ProfileId::new(self.store.next_id.fetch_add(1, Ordering::SeqCst));
        let profile = Profile::from_draft(id, draft, self.store.clock.now());
        self.stage(&profile);
        Ok(profile)
    }

    fn activate(&mut self, profile: &mut Profile) -> Result<Activation, StoreError> {
        if let Some(reason) = profile.reason_not_to_activate() {
            return Ok(Activation::Blocked(reason));
        }
        profile.active = true;
        profile.activated_at = Some(self.store.clock.now());
        self.stage(profile);
        Ok(Activation::Activated)
    }

    fn commit(self) -> Result<(), StoreError> {
        let store = self.store;
        if store.fail_commits.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("injected commit failure".to_string()));
        }
        let mut profiles = store.profiles.lock().unwrap();
        // a concurrent transaction may have committed the same key since create
        for profile in &self.pending {
            let clash = profiles
                .values()
                .any(|p| p.id != profile.id && p.idempotency_key == profile.idempotency_key);
            if clash {
                return Err(StoreError::Duplicate(profile.idempotency_key.to_string()));
            }
        }
        for profile in self.pending {
            profiles.insert(profile.id, profile);
        }
        Ok(())
    }
}
