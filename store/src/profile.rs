//! Profile storage trait.

use crate::StoreError;
use idv_crypto::EncryptedPii;
use idv_types::{
    FraudPendingReason, IdempotencyKey, PersonalKey, ProfileId, ServiceProvider, Timestamp,
    UserId,
};
use serde::{Deserialize, Serialize};

/// Everything needed to persist a new profile.
#[derive(Clone, Debug)]
pub struct ProfileDraft {
    pub user_id: UserId,
    pub initiating_service_provider: Option<ServiceProvider>,
    /// PII sealed under the user's password.
    pub encrypted_pii: EncryptedPii,
    /// PII sealed under the personal key, for account recovery.
    pub encrypted_pii_recovery: EncryptedPii,
    pub personal_key: PersonalKey,
    /// Unique per browser session; the store rejects a second draft with the same key.
    pub idempotency_key: IdempotencyKey,
    pub fraud_pending_reason: Option<FraudPendingReason>,
    pub gpo_verification_needed: bool,
    pub in_person_verification_needed: bool,
}

/// A durable identity profile.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Profile {
    pub id: ProfileId,
    pub user_id: UserId,
    pub initiating_service_provider: Option<ServiceProvider>,
    pub encrypted_pii: EncryptedPii,
    pub encrypted_pii_recovery: EncryptedPii,
    pub idempotency_key: IdempotencyKey,
    /// Only populated on the value returned from creation; never read back from storage.
    #[serde(skip)]
    pub personal_key: Option<PersonalKey>,
    pub fraud_pending_reason: Option<FraudPendingReason>,
    pub gpo_verification_pending_at: Option<Timestamp>,
    pub in_person_verification_pending_at: Option<Timestamp>,
    pub active: bool,
    pub activated_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

/// A condition that holds a profile back from activation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PendingReason {
    FraudReview(FraudPendingReason),
    GpoVerification,
    InPersonVerification,
}

/// Result of an activation attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Activation {
    Activated,
    Blocked(PendingReason),
}

impl Profile {
    /// Build the stored record for a draft. Backends assign `id` and timestamps.
    pub fn from_draft(id: ProfileId, draft: ProfileDraft, now: Timestamp) -> Self {
        Self {
            id,
            user_id: draft.user_id,
            initiating_service_provider: draft.initiating_service_provider,
            encrypted_pii: draft.encrypted_pii,
            encrypted_pii_recovery: draft.encrypted_pii_recovery,
            idempotency_key: draft.idempotency_key,
            personal_key: Some(draft.personal_key),
            fraud_pending_reason: draft.fraud_pending_reason,
            gpo_verification_pending_at: draft.gpo_verification_needed.then_some(now),
            in_person_verification_pending_at: draft.in_person_verification_needed.then_some(now),
            active: false,
            activated_at: None,
            created_at: now,
        }
    }

    /// All conditions currently blocking activation, in reporting order
    /// (fraud review, then mailed code, then in-person).
    pub fn pending_reasons(&self) -> Vec<PendingReason> {
        let mut reasons = Vec::new();
        if let Some(reason) = self.fraud_pending_reason {
            reasons.push(PendingReason::FraudReview(reason));
        }
        if self.gpo_verification_pending_at.is_some() {
            reasons.push(PendingReason::GpoVerification);
        }
        if self.in_person_verification_pending_at.is_some() {
            reasons.push(PendingReason::InPersonVerification);
        }
        reasons
    }

    /// The highest-priority reason not to activate, if any.
    pub fn reason_not_to_activate(&self) -> Option<PendingReason> {
        self.pending_reasons().into_iter().next()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }
}

/// Trait for profile storage.
///
/// Writes go through a [`ProfileWriteTxn`]; dropping the transaction without
/// committing discards every write made through it.
pub trait ProfileStore {
    type WriteTxn<'a>: ProfileWriteTxn
    where
        Self: 'a;

    fn begin_write(&self) -> Result<Self::WriteTxn<'_>, StoreError>;

    fn find(&self, id: ProfileId) -> Result<Option<Profile>, StoreError>;
}

/// Writable transaction over the profile store.
pub trait ProfileWriteTxn {
    /// Persist a new inactive profile.
    ///
    /// Fails with [`StoreError::Duplicate`] if a profile with the same
    /// idempotency key already exists.
    fn create_profile(&mut self, draft: ProfileDraft) -> Result<Profile, StoreError>;

    /// Activate a profile unless something blocks it.
    fn activate(&mut self, profile: &mut Profile) -> Result<Activation, StoreError>;

    fn commit(self) -> Result<(), StoreError>;
}
