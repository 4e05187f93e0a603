//! Profile orchestrator: turns a completed IdV session into a durable
//! profile and drives whichever confirmation path it still needs.

use crate::config::IdvConfig;
use crate::error::SessionError;
use crate::profile_maker::{fraud_pending_reason, ProfileFlags, ProfileMaker};
use crate::relocation::PiiRelocator;
use crate::session::IdvSession;
use crate::state::ProfileStatus;
use crate::tracing_spans::profile_create_span;
use idv_store::{
    Activation, GpoConfirmationMaker, GpoOtp, InPersonEnrollments, PendingReason, PiiCache,
    Profile, ProfileDraft, ProfileStore, ProfileWriteTxn, StoreError,
};
use idv_types::{
    AddressMechanism, Password, Pii, PiiPayload, ProfileId, ServiceProvider, User, UserId,
};
use tracing::{debug, info, warn};

const GPO_VENDOR: &str = "gpo_confirmation_maker";
const IN_PERSON_VENDOR: &str = "in_person_enrollment";

/// Events emitted by the orchestrator for the host to process (analytics,
/// notifications).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IdvEvent {
    ProfileCreated {
        profile_id: ProfileId,
        user_id: UserId,
        pending: Vec<PendingReason>,
    },
    ProfileActivated { profile_id: ProfileId },
    PiiRelocated { profile_id: ProfileId },
    InPersonEnrollmentAssociated { profile_id: ProfileId, enrollment_id: u64 },
    GpoLetterRequested { profile_id: ProfileId },
    InPersonEnrollmentScheduled { profile_id: ProfileId },
}

/// What profile creation produced.
#[derive(Clone, Debug)]
pub struct ProfileOutcome {
    pub profile_id: ProfileId,
    pub status: ProfileStatus,
    /// Every condition still blocking activation, fraud review first.
    pub pending_reasons: Vec<PendingReason>,
    /// The code printed on the mailed letter, when one was requested.
    pub gpo_otp: Option<GpoOtp>,
}

/// Ties the session to its collaborators for the final step of the flow.
pub struct ProfileOrchestrator<'a, P, C, G, E> {
    config: &'a IdvConfig,
    profiles: &'a P,
    pii_cache: &'a C,
    gpo: &'a G,
    in_person: &'a E,
    /// Pending events for the host to process.
    pending_events: Vec<IdvEvent>,
}

impl<'a, P, C, G, E> ProfileOrchestrator<'a, P, C, G, E>
where
    P: ProfileStore,
    C: PiiCache,
    G: GpoConfirmationMaker,
    E: InPersonEnrollments,
{
    pub fn new(
        config: &'a IdvConfig,
        profiles: &'a P,
        pii_cache: &'a C,
        gpo: &'a G,
        in_person: &'a E,
    ) -> Self {
        Self {
            config,
            profiles,
            pii_cache,
            gpo,
            in_person,
            pending_events: Vec::new(),
        }
    }

    /// Create (and, when nothing blocks it, activate) the profile for this
    /// session, then run the confirmation path it still needs.
    ///
    /// The profile is created and activated in one store transaction. Once
    /// it is committed the session records it; later failures
    /// ([`SessionError::PiiRelocationFailed`], [`SessionError::VendorCallFailed`])
    /// leave the profile in place and can be recovered with
    /// [`relocate_pii`](Self::relocate_pii), [`request_gpo_letter`](Self::request_gpo_letter)
    /// or [`schedule_in_person`](Self::schedule_in_person).
    pub fn create_profile(
        &mut self,
        session: &mut IdvSession,
        password: &Password,
        user: &User,
        service_provider: Option<&ServiceProvider>,
    ) -> Result<ProfileOutcome, SessionError> {
        let span = profile_create_span(&user.id);
        let _guard = span.enter();

        if let Some(existing) = session.profile_id() {
            return Err(SessionError::ProfileAlreadyCreated(existing));
        }
        let applicant = session
            .attributes
            .applicant
            .clone()
            .ok_or(SessionError::MissingApplicant)?;

        let enrollment = self
            .in_person
            .establishing_enrollment(&user.id)
            .map_err(SessionError::ProfileCreationFailed)?;

        let flags = ProfileFlags {
            fraud_pending_reason: fraud_pending_reason(
                self.config,
                session.attributes.threatmetrix_review_status,
            ),
            gpo_verification_needed: session.gpo_verification_needed(),
            in_person_verification_needed: enrollment.is_some(),
        };
        let draft = ProfileMaker::new(&applicant, user, service_provider, self.config.kdf_params())
            .build(password, session.id(), session.flow_nonce(), flags)?;

        let (profile, activation) = self
            .persist(draft)
            .map_err(SessionError::ProfileCreationFailed)?;
        span.record("profile_id", profile.id.get());
        info!(?activation, "profile created");

        session.attributes.set_profile_id(Some(profile.id))?;
        session.attributes.pii = Some(PiiPayload::Inline(applicant.clone()));
        session.attributes.personal_key = profile.personal_key.clone();
        self.pending_events.push(IdvEvent::ProfileCreated {
            profile_id: profile.id,
            user_id: user.id,
            pending: profile.pending_reasons(),
        });

        let staged = self
            .pii_cache
            .save(password, &profile, &applicant)
            .map_err(SessionError::PiiRelocationFailed)?;
        session.stage_pii(staged);

        if let Some(enrollment) = &enrollment {
            self.in_person
                .associate(enrollment, profile.id)
                .map_err(SessionError::EnrollmentAssociationFailed)?;
            self.pending_events.push(IdvEvent::InPersonEnrollmentAssociated {
                profile_id: profile.id,
                enrollment_id: enrollment.id,
            });
        }

        let mut gpo_otp = None;
        let status = match activation {
            Activation::Activated => {
                self.pending_events.push(IdvEvent::ProfileActivated {
                    profile_id: profile.id,
                });
                self.relocate_pii(session, &user.id)?;
                ProfileStatus::Activated
            }
            Activation::Blocked(_)
                if session.attributes.address_verification_mechanism
                    == Some(AddressMechanism::Gpo) =>
            {
                self.relocate_pii(session, &user.id)?;
                gpo_otp = Some(self.send_letter(session, &user.id, &profile, service_provider)?);
                ProfileStatus::PendingGpo
            }
            Activation::Blocked(_) if enrollment.is_some() => {
                self.schedule(session, &user.id, profile.id)?;
                ProfileStatus::PendingInPerson
            }
            Activation::Blocked(reason) => ProfileStatus::pending(reason),
        };

        Ok(ProfileOutcome {
            profile_id: profile.id,
            status,
            pending_reasons: profile.pending_reasons(),
            gpo_otp,
        })
    }

    /// Move staged PII into the durable cache. No-op when nothing is staged.
    pub fn relocate_pii(
        &mut self,
        session: &mut IdvSession,
        user: &UserId,
    ) -> Result<bool, SessionError> {
        let relocated = PiiRelocator::new(self.pii_cache).relocate_pii(session, user)?;
        if relocated {
            if let Some(profile_id) = session.profile_id() {
                self.pending_events.push(IdvEvent::PiiRelocated { profile_id });
            }
        }
        Ok(relocated)
    }

    /// Request a (new) mailed confirmation code for the session's profile.
    pub fn request_gpo_letter(
        &mut self,
        session: &IdvSession,
        user: &UserId,
        service_provider: Option<&ServiceProvider>,
    ) -> Result<GpoOtp, SessionError> {
        let profile = self.session_profile(session)?;
        self.send_letter(session, user, &profile, service_provider)
    }

    /// Hand the user's in-person enrollment to the vendor.
    pub fn schedule_in_person(
        &mut self,
        session: &IdvSession,
        user: &UserId,
    ) -> Result<(), SessionError> {
        let profile_id = session.profile_id().ok_or(SessionError::NoProfile)?;
        self.schedule(session, user, profile_id)
    }

    /// The session's PII, fetching it from the cache when the session only
    /// holds a reference.
    pub fn resolve_pii(&self, session: &IdvSession, user: &UserId) -> Result<Pii, SessionError> {
        match &session.attributes.pii {
            Some(PiiPayload::Inline(pii)) => Ok(pii.clone()),
            Some(PiiPayload::CacheReference(token)) => {
                let cached = self
                    .pii_cache
                    .exists_in_session(user)
                    .map_err(SessionError::PiiRelocationFailed)?;
                if !cached {
                    warn!("session references PII the cache no longer holds");
                    return Err(SessionError::PiiRelocationFailed(StoreError::NotFound(
                        "cached pii".to_string(),
                    )));
                }
                self.pii_cache
                    .fetch(user, token)
                    .map_err(SessionError::PiiRelocationFailed)
            }
            None => session
                .attributes
                .applicant
                .clone()
                .ok_or(SessionError::MissingApplicant),
        }
    }

    /// Drain all pending events.
    pub fn drain_events(&mut self) -> Vec<IdvEvent> {
        std::mem::take(&mut self.pending_events)
    }

    fn persist(&self, draft: ProfileDraft) -> Result<(Profile, Activation), StoreError> {
        let mut txn = self.profiles.begin_write()?;
        let mut profile = txn.create_profile(draft)?;
        let activation = match profile.reason_not_to_activate() {
            Some(reason) => Activation::Blocked(reason),
            None => txn.activate(&mut profile)?,
        };
        txn.commit()?;
        Ok((profile, activation))
    }

    fn session_profile(&self, session: &IdvSession) -> Result<Profile, SessionError> {
        let profile_id = session.profile_id().ok_or(SessionError::NoProfile)?;
        self.profiles
            .find(profile_id)
            .map_err(SessionError::ProfileLookupFailed)?
            .ok_or(SessionError::NoProfile)
    }

    fn send_letter(
        &mut self,
        session: &IdvSession,
        user: &UserId,
        profile: &Profile,
        service_provider: Option<&ServiceProvider>,
    ) -> Result<GpoOtp, SessionError> {
        let pii = self.resolve_pii(session, user)?;
        let otp = self
            .gpo
            .generate(&pii, service_provider, profile)
            .map_err(|source| SessionError::VendorCallFailed {
                vendor: GPO_VENDOR,
                source,
            })?;
        debug!(profile_id = %profile.id, "mailed confirmation code generated");
        self.pending_events.push(IdvEvent::GpoLetterRequested {
            profile_id: profile.id,
        });
        Ok(otp)
    }

    fn schedule(
        &mut self,
        session: &IdvSession,
        user: &UserId,
        profile_id: ProfileId,
    ) -> Result<(), SessionError> {
        let pii = self.resolve_pii(session, user)?;
        self.in_person
            .schedule_enrollment(user, &pii)
            .map_err(|source| SessionError::VendorCallFailed {
                vendor: IN_PERSON_VENDOR,
                source,
            })?;
        debug!(%profile_id, "in-person enrollment scheduled");
        self.pending_events
            .push(IdvEvent::InPersonEnrollmentScheduled { profile_id });
        Ok(())
    }
}
