//! Where a session stands in the IdV flow.
//!
//! ```text
//! NotStarted → ApplicantAssembled → ResolutionAttempted → AddressMechanismChosen
//!   → PhoneConfirmed → ProfileCreated(status) → PersonalKeyIssued
//! ```
//!
//! The phase is derived from the session attributes on demand, never stored.

use crate::session::IdvSession;
use idv_store::{PendingReason, Profile};
use idv_types::{AddressMechanism, FraudPendingReason};

/// The result of profile creation as seen by the flow.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProfileStatus {
    Activated,
    PendingGpo,
    PendingFraudReview(FraudPendingReason),
    PendingInPerson,
}

impl ProfileStatus {
    pub fn pending(reason: PendingReason) -> Self {
        match reason {
            PendingReason::FraudReview(fraud) => Self::PendingFraudReview(fraud),
            PendingReason::GpoVerification => Self::PendingGpo,
            PendingReason::InPersonVerification => Self::PendingInPerson,
        }
    }

    /// Status of a stored profile. `None` for an inactive profile with
    /// nothing pending (deactivated outside this flow).
    pub fn of(profile: &Profile) -> Option<Self> {
        if profile.is_active() {
            return Some(Self::Activated);
        }
        profile.reason_not_to_activate().map(Self::pending)
    }

    pub fn is_pending(&self) -> bool {
        !matches!(self, Self::Activated)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IdvPhase {
    NotStarted,
    ApplicantAssembled,
    ResolutionAttempted { successful: bool },
    AddressMechanismChosen(AddressMechanism),
    PhoneConfirmed,
    /// `None` when the profile record was not supplied.
    ProfileCreated(Option<ProfileStatus>),
    PersonalKeyIssued,
}

impl IdvSession {
    /// Current phase. Pass the session's profile, if loaded, to get its status.
    pub fn phase(&self, profile: Option<&Profile>) -> IdvPhase {
        let attrs = &self.attributes;
        if let Some(profile_id) = self.profile_id() {
            if attrs.personal_key.is_none() {
                return IdvPhase::PersonalKeyIssued;
            }
            let status = profile
                .filter(|p| p.id == profile_id)
                .and_then(ProfileStatus::of);
            return IdvPhase::ProfileCreated(status);
        }
        if self.phone_confirmed() {
            return IdvPhase::PhoneConfirmed;
        }
        if self.address_mechanism_chosen() {
            let mechanism = attrs.address_verification_mechanism.unwrap_or_default();
            return IdvPhase::AddressMechanismChosen(mechanism);
        }
        if let Some(successful) = attrs.resolution_successful {
            return IdvPhase::ResolutionAttempted { successful };
        }
        if attrs.applicant.is_some() {
            return IdvPhase::ApplicantAssembled;
        }
        IdvPhase::NotStarted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::IdvConfig;
    use crate::phone::PhoneConfirmation;
    use idv_types::{Applicant, PersonalKey, ProfileId, SessionId};

    fn session() -> IdvSession {
        IdvSession::new(SessionId::new("s"), &IdvConfig::for_tests())
    }

    #[test]
    fn walks_forward_through_phases() {
        let mut s = session();
        assert_eq!(s.phase(None), IdvPhase::NotStarted);

        s.attributes.applicant = Some(Applicant::default());
        assert_eq!(s.phase(None), IdvPhase::ApplicantAssembled);

        s.attributes.resolution_successful = Some(false);
        assert_eq!(
            s.phase(None),
            IdvPhase::ResolutionAttempted { successful: false }
        );

        s.attributes.resolution_successful = Some(true);
        s.attributes.phone_confirmation = PhoneConfirmation::VendorConfirmed;
        assert_eq!(
            s.phase(None),
            IdvPhase::AddressMechanismChosen(AddressMechanism::Phone)
        );

        s.attributes.phone_confirmation = PhoneConfirmation::UserConfirmed;
        assert_eq!(s.phase(None), IdvPhase::PhoneConfirmed);

        s.attributes.set_profile_id(Some(ProfileId::new(1))).unwrap();
        s.attributes.personal_key = Some(PersonalKey::parse("AAAA-BBBB-CCCC-DDDD").unwrap());
        assert_eq!(s.phase(None), IdvPhase::ProfileCreated(None));

        s.acknowledge_personal_key();
        assert_eq!(s.phase(None), IdvPhase::PersonalKeyIssued);
    }

    #[test]
    fn gpo_choice_is_a_phase() {
        let mut s = session();
        s.attributes.address_verification_mechanism = Some(AddressMechanism::Gpo);
        assert_eq!(
            s.phase(None),
            IdvPhase::AddressMechanismChosen(AddressMechanism::Gpo)
        );
    }

    #[test]
    fn pending_reason_maps_to_status() {
        assert_eq!(
            ProfileStatus::pending(PendingReason::GpoVerification),
            ProfileStatus::PendingGpo
        );
        assert!(ProfileStatus::PendingInPerson.is_pending());
        assert!(!ProfileStatus::Activated.is_pending());
    }
}
