//! Step invalidation: clears the results of later steps when an earlier
//! step's input changes.
//!
//! These are pure in-memory mutations of the IdV session and never fail.
//! Once a profile exists they refuse to run: the profile was built from
//! the current step results, and only an explicit restart may discard them.

use crate::session::IdvSession;
use idv_types::AddressMechanism;
use tracing::{debug, warn};

/// What an invalidation did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InvalidationOutcome {
    Cleared,
    /// The session already has a profile; nothing was changed.
    ProfileLocked,
}

/// Clears dependent step results.
pub struct StepInvalidator;

impl StepInvalidator {
    /// The SSN changed: drop the applicant, the resolution result and any
    /// phone confirmation tied to the old identity.
    pub fn invalidate_steps_after_ssn(&self, session: &mut IdvSession) -> InvalidationOutcome {
        self.guarded(session, "steps_after_ssn", |session| {
            session.attributes.applicant = None;
            clear_verify_info(session);
            clear_phone(session);
        })
    }

    pub fn invalidate_verify_info_step(&self, session: &mut IdvSession) -> InvalidationOutcome {
        self.guarded(session, "verify_info_step", clear_verify_info)
    }

    /// Resolution is being re-run: forget the mailing preference and the phone step.
    pub fn invalidate_steps_after_verify_info(
        &self,
        session: &mut IdvSession,
    ) -> InvalidationOutcome {
        self.guarded(session, "steps_after_verify_info", |session| {
            session.attributes.address_verification_mechanism = Some(AddressMechanism::Phone);
            clear_phone(session);
        })
    }

    pub fn invalidate_phone_step(&self, session: &mut IdvSession) -> InvalidationOutcome {
        self.guarded(session, "phone_step", clear_phone)
    }

    /// Drop the assembled applicant without touching later steps.
    pub fn clear_applicant(&self, session: &mut IdvSession) -> InvalidationOutcome {
        self.guarded(session, "applicant", |session| {
            session.attributes.applicant = None;
        })
    }

    fn guarded(
        &self,
        session: &mut IdvSession,
        step: &'static str,
        clear: impl FnOnce(&mut IdvSession),
    ) -> InvalidationOutcome {
        if let Some(profile_id) = session.profile_id() {
            warn!(step, %profile_id, "refusing to invalidate steps of a session with a profile");
            return InvalidationOutcome::ProfileLocked;
        }
        clear(session);
        debug!(step, session = %session.id(), "invalidated");
        InvalidationOutcome::Cleared
    }
}

fn clear_verify_info(session: &mut IdvSession) {
    session.attributes.resolution_successful = None;
}

fn clear_phone(session: &mut IdvSession) {
    session.attributes.phone_confirmation = Default::default();
    session.set_otp_session(None);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::IdvConfig;
    use crate::phone::PhoneConfirmation;
    use idv_types::{Applicant, ProfileId, SessionId};

    fn populated() -> IdvSession {
        let mut session = IdvSession::new(SessionId::new("s"), &IdvConfig::for_tests());
        session.attributes.applicant = Some(Applicant {
            ssn: Some("900-12-3456".into()),
            ..Default::default()
        });
        session.attributes.resolution_successful = Some(true);
        session.attributes.address_verification_mechanism = Some(AddressMechanism::Gpo);
        session.attributes.phone_confirmation = PhoneConfirmation::UserConfirmed;
        session
    }

    #[test]
    fn after_ssn_cascades() {
        let mut session = populated();
        assert_eq!(
            StepInvalidator.invalidate_steps_after_ssn(&mut session),
            InvalidationOutcome::Cleared
        );
        assert!(session.attributes.applicant.is_none());
        assert!(session.attributes.resolution_successful.is_none());
        assert_eq!(session.attributes.phone_confirmation, PhoneConfirmation::NotStarted);
        // mechanism is left alone
        assert_eq!(
            session.attributes.address_verification_mechanism,
            Some(AddressMechanism::Gpo)
        );
    }

    #[test]
    fn after_verify_info_resets_mechanism_to_phone() {
        let mut session = populated();
        StepInvalidator.invalidate_steps_after_verify_info(&mut session);
        assert_eq!(
            session.attributes.address_verification_mechanism,
            Some(AddressMechanism::Phone)
        );
        assert!(!session.phone_confirmed());
        assert_eq!(session.attributes.resolution_successful, Some(true));
    }

    #[test]
    fn verify_info_only_clears_resolution() {
        let mut session = populated();
        StepInvalidator.invalidate_verify_info_step(&mut session);
        assert!(session.attributes.resolution_successful.is_none());
        assert!(session.phone_confirmed());
    }

    #[test]
    fn idempotent_on_clear_session() {
        let mut session = IdvSession::new(SessionId::new("s"), &IdvConfig::for_tests());
        StepInvalidator.invalidate_steps_after_ssn(&mut session);
        let once = session.attributes.clone();
        StepInvalidator.invalidate_steps_after_ssn(&mut session);
        assert_eq!(session.attributes, once);
    }

    #[test]
    fn locked_once_profile_exists() {
        let mut session = populated();
        session
            .attributes
            .set_profile_id(Some(ProfileId::new(3)))
            .unwrap();
        let before = session.attributes.clone();

        assert_eq!(
            StepInvalidator.invalidate_steps_after_ssn(&mut session),
            InvalidationOutcome::ProfileLocked
        );
        assert_eq!(
            StepInvalidator.invalidate_phone_step(&mut session),
            InvalidationOutcome::ProfileLocked
        );
        assert_eq!(session.attributes, before);
    }
}
