//! Builds a profile draft from the assembled applicant.

use crate::config::IdvConfig;
use crate::error::SessionError;
use idv_crypto::{derive_idempotency_key, encrypt_pii, generate_personal_key, KdfParams};
use idv_store::ProfileDraft;
use idv_types::{
    Applicant, FraudPendingReason, Password, ServiceProvider, SessionId, ThreatMetrixReviewStatus,
    User,
};
use uuid::Uuid;

/// Conditions recorded on a new profile that may hold back activation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ProfileFlags {
    pub fraud_pending_reason: Option<FraudPendingReason>,
    pub gpo_verification_needed: bool,
    pub in_person_verification_needed: bool,
}

/// Fraud hold derived from the device-profiling review status. Always
/// `None` unless decisioning is enabled.
pub fn fraud_pending_reason(
    config: &IdvConfig,
    status: Option<ThreatMetrixReviewStatus>,
) -> Option<FraudPendingReason> {
    if !config.device_profiling_decisioning_enabled {
        return None;
    }
    status.and_then(FraudPendingReason::from_review_status)
}

pub struct ProfileMaker<'a> {
    applicant: &'a Applicant,
    user: &'a User,
    service_provider: Option<&'a ServiceProvider>,
    kdf: KdfParams,
}

impl<'a> ProfileMaker<'a> {
    pub fn new(
        applicant: &'a Applicant,
        user: &'a User,
        service_provider: Option<&'a ServiceProvider>,
        kdf: KdfParams,
    ) -> Self {
        Self {
            applicant,
            user,
            service_provider,
            kdf,
        }
    }

    /// Seal the applicant under the password and under a fresh personal key.
    pub fn build(
        &self,
        password: &Password,
        session: &SessionId,
        flow: Option<&Uuid>,
        flags: ProfileFlags,
    ) -> Result<ProfileDraft, SessionError> {
        let personal_key = generate_personal_key();
        let encrypted_pii = encrypt_pii(self.applicant, password, &self.kdf)?;
        let recovery_password = Password::new(personal_key.expose());
        let encrypted_pii_recovery = encrypt_pii(self.applicant, &recovery_password, &self.kdf)?;

        Ok(ProfileDraft {
            user_id: self.user.id,
            initiating_service_provider: self.service_provider.cloned(),
            encrypted_pii,
            encrypted_pii_recovery,
            personal_key,
            idempotency_key: derive_idempotency_key(session, flow, &self.user.id),
            fraud_pending_reason: flags.fraud_pending_reason,
            gpo_verification_needed: flags.gpo_verification_needed,
            in_person_verification_needed: flags.in_person_verification_needed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use idv_crypto::decrypt_pii;
    use idv_types::UserId;

    fn applicant() -> Applicant {
        Applicant {
            first_name: Some("Fakey".into()),
            last_name: Some("McFakerson".into()),
            ssn: Some("900-12-3456".into()),
            ..Default::default()
        }
    }

    #[test]
    fn draft_decrypts_with_password_and_personal_key() {
        let applicant = applicant();
        let user = User::new(UserId::random());
        let maker = ProfileMaker::new(&applicant, &user, None, KdfParams::insecure_fast());
        let draft = maker
            .build(&Password::new("sekrit"), &SessionId::new("s"), None, ProfileFlags::default())
            .unwrap();

        assert_eq!(decrypt_pii(&draft.encrypted_pii, &Password::new("sekrit")).unwrap(), applicant);
        let recovery = Password::new(draft.personal_key.expose());
        assert_eq!(decrypt_pii(&draft.encrypted_pii_recovery, &recovery).unwrap(), applicant);
        assert_eq!(draft.user_id, user.id);
    }

    #[test]
    fn idempotency_key_stable_per_session() {
        let applicant = applicant();
        let user = User::new(UserId::random());
        let sp = ServiceProvider::new("urn:gov:sp:test");
        let maker = ProfileMaker::new(&applicant, &user, Some(&sp), KdfParams::insecure_fast());
        let flags = ProfileFlags {
            gpo_verification_needed: true,
            ..Default::default()
        };
        let a = maker.build(&Password::new("pw"), &SessionId::new("s"), None, flags).unwrap();
        let b = maker.build(&Password::new("pw"), &SessionId::new("s"), None, flags).unwrap();
        assert_eq!(a.idempotency_key, b.idempotency_key);
        assert_ne!(a.personal_key, b.personal_key);
        assert!(a.gpo_verification_needed);
        assert_eq!(a.initiating_service_provider, Some(sp));
    }

    #[test]
    fn fraud_reason_requires_decisioning() {
        let mut config = IdvConfig::for_tests();
        let status = Some(ThreatMetrixReviewStatus::Reject);
        assert_eq!(fraud_pending_reason(&config, status), None);

        config.device_profiling_decisioning_enabled = true;
        assert_eq!(
            fraud_pending_reason(&config, status),
            Some(FraudPendingReason::ThreatmetrixReject)
        );
        assert_eq!(
            fraud_pending_reason(&config, Some(ThreatMetrixReviewStatus::Pass)),
            None
        );
        assert_eq!(fraud_pending_reason(&config, None), None);
    }
}
