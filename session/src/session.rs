//! The IdV session: a typed view over one namespace of the user's web session.

use crate::address::AddressResolver;
use crate::attributes::{Attribute, SessionAttributes};
use crate::config::{IdvConfig, UnknownAttributePolicy};
use crate::error::SessionError;
use crate::phone::{FailedPhoneNumbers, PhoneOtpSession};
use idv_store::{PhoneNormalizer, StagedPii};
use idv_types::{Applicant, E164Phone, Pii, ProfileId, SessionId, TypeError, User};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};
use uuid::Uuid;

const STAGED_PII_KEY: &str = "decrypted_pii";
const OTP_SESSION_KEY: &str = "user_phone_confirmation_session";
const FAILED_PHONES_KEY: &str = "failed_phone_step_params";
const FLOW_NONCE_KEY: &str = "flow_nonce";
const IN_PERSON_PII_KEY: &str = "pii_from_user";

/// The per-user web session, owned by the host application.
///
/// A JSON object keyed by namespace. This crate only touches the IdV and
/// in-person namespaces.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UserSession {
    id: SessionId,
    #[serde(default)]
    data: Map<String, Value>,
}

impl UserSession {
    pub fn new(id: SessionId) -> Self {
        Self {
            id,
            data: Map::new(),
        }
    }

    pub fn with_data(id: SessionId, data: Map<String, Value>) -> Self {
        Self { id, data }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn data(&self) -> &Map<String, Value> {
        &self.data
    }

    /// The object stored under `key`, if it is one.
    pub fn namespace(&self, key: &str) -> Option<&Map<String, Value>> {
        self.data.get(key).and_then(Value::as_object)
    }

    pub fn replace_namespace(&mut self, key: &str, values: Map<String, Value>) {
        self.data.insert(key.to_string(), Value::Object(values));
    }

    pub fn remove_namespace(&mut self, key: &str) -> bool {
        self.data.remove(key).is_some()
    }
}

/// Typed IdV session state for one user.
///
/// Load it from the [`UserSession`] at the start of a request, mutate it,
/// and [`store`](IdvSession::store) it back.
#[derive(Clone, Debug)]
pub struct IdvSession {
    id: SessionId,
    namespace: String,
    in_person_namespace: String,
    policy: UnknownAttributePolicy,
    pub attributes: SessionAttributes,
    staged_pii: Option<StagedPii>,
    otp_session: Option<PhoneOtpSession>,
    failed_phone_numbers: FailedPhoneNumbers,
    in_person_pii: Option<Pii>,
    /// Set by [`clear`](IdvSession::clear); part of the profile idempotency key.
    flow_nonce: Option<Uuid>,
}

impl IdvSession {
    /// An empty session that has not been persisted yet.
    pub fn new(id: SessionId, config: &IdvConfig) -> Self {
        Self {
            id,
            namespace: config.session_namespace.clone(),
            in_person_namespace: config.in_person_namespace.clone(),
            policy: config.unknown_attribute_policy,
            attributes: SessionAttributes::default(),
            staged_pii: None,
            otp_session: None,
            failed_phone_numbers: FailedPhoneNumbers::default(),
            in_person_pii: None,
            flow_nonce: None,
        }
    }

    /// Read the IdV namespace out of `user_session`.
    ///
    /// Only allow-listed attributes and this component's own bookkeeping keys
    /// are read. Other keys are ignored and will not be written back.
    /// Values that fail validation are dropped with a warning.
    pub fn load(user_session: &UserSession, config: &IdvConfig) -> Self {
        let mut session = Self::new(user_session.id().clone(), config);
        session.in_person_pii = user_session
            .namespace(&config.in_person_namespace)
            .and_then(|ns| read_key(ns, IN_PERSON_PII_KEY));
        let Some(stored) = user_session.namespace(&config.session_namespace) else {
            return session;
        };

        // vendor confirmation must land before the user confirmation that depends on it
        let order = Attribute::ALL
            .iter()
            .copied()
            .filter(|&attr| attr != Attribute::UserPhoneConfirmation)
            .chain(std::iter::once(Attribute::UserPhoneConfirmation));
        for attr in order {
            let Some(value) = stored.get(attr.name()) else {
                continue;
            };
            if let Err(e) = session.attributes.set(attr, Some(value.clone())) {
                warn!(attribute = %attr, error = %e, "dropping invalid stored attribute");
            }
        }

        session.staged_pii = read_key(stored, STAGED_PII_KEY);
        session.otp_session = read_key(stored, OTP_SESSION_KEY);
        session.failed_phone_numbers = read_key(stored, FAILED_PHONES_KEY).unwrap_or_default();
        session.flow_nonce = read_key(stored, FLOW_NONCE_KEY);

        let ignored = stored
            .keys()
            .filter(|key| !is_owned_key(key))
            .count();
        if ignored > 0 {
            debug!(ignored, "ignoring unrecognized keys in idv session namespace");
        }

        session
    }

    /// Write the IdV namespace back into `user_session`, replacing it.
    pub fn store(&self, user_session: &mut UserSession) {
        let mut values: Map<String, Value> = self
            .attributes
            .iter_set()
            .map(|(attr, value)| (attr.name().to_string(), value))
            .collect();
        write_key(&mut values, STAGED_PII_KEY, &self.staged_pii);
        write_key(&mut values, OTP_SESSION_KEY, &self.otp_session);
        if !self.failed_phone_numbers.is_empty() {
            write_key(&mut values, FAILED_PHONES_KEY, &Some(&self.failed_phone_numbers));
        }
        write_key(&mut values, FLOW_NONCE_KEY, &self.flow_nonce);
        user_session.replace_namespace(&self.namespace, values);
    }

    /// Drop all IdV state, both in memory and in `user_session`, and start a
    /// new flow.
    ///
    /// Only a fresh flow nonce is written back, so a later profile creation
    /// in the same browser session gets a new idempotency key.
    pub fn clear(&mut self, user_session: &mut UserSession) {
        user_session.remove_namespace(&self.namespace);
        user_session.remove_namespace(&self.in_person_namespace);
        self.attributes = SessionAttributes::default();
        self.staged_pii = None;
        self.otp_session = None;
        self.failed_phone_numbers = FailedPhoneNumbers::default();
        self.in_person_pii = None;
        self.flow_nonce = Some(Uuid::new_v4());
        self.store(user_session);
        debug!(session = %self.id, "idv session cleared");
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    /// Nonce of the current attempt, absent until the first restart.
    pub fn flow_nonce(&self) -> Option<&Uuid> {
        self.flow_nonce.as_ref()
    }

    // ── By-name access ─────────────────────────────────────────────────

    /// Read an attribute by name.
    ///
    /// Unknown names fail with [`SessionError::UnknownAttribute`] under the
    /// `reject` policy and read as `None` under `log_and_ignore`.
    pub fn get(&self, name: &str) -> Result<Option<Value>, SessionError> {
        Ok(self
            .resolve(name)?
            .and_then(|attr| self.attributes.get(attr)))
    }

    /// Write an attribute by name. `None` clears it.
    pub fn set(&mut self, name: &str, value: Option<Value>) -> Result<(), SessionError> {
        match self.resolve(name)? {
            Some(attr) => self.attributes.set(attr, value),
            None => Ok(()),
        }
    }

    /// Names and values of every attribute that is currently set.
    pub fn set_attributes(&self) -> Vec<(Attribute, Value)> {
        self.attributes.iter_set().collect()
    }

    fn resolve(&self, name: &str) -> Result<Option<Attribute>, SessionError> {
        match name.parse::<Attribute>() {
            Ok(attr) => Ok(Some(attr)),
            Err(e) => match self.policy {
                UnknownAttributePolicy::Reject => Err(e),
                UnknownAttributePolicy::LogAndIgnore => {
                    warn!(attribute = name, "ignoring unknown idv session attribute");
                    Ok(None)
                }
            },
        }
    }

    // ── Derived predicates ─────────────────────────────────────────────

    pub fn profile_id(&self) -> Option<ProfileId> {
        self.attributes.profile_id()
    }

    pub fn phone_confirmed(&self) -> bool {
        AddressResolver.phone_confirmed(&self.attributes)
    }

    pub fn address_mechanism_chosen(&self) -> bool {
        AddressResolver.address_mechanism_chosen(&self.attributes)
    }

    pub fn address_step_complete(&self) -> bool {
        AddressResolver.address_step_complete(&self.attributes)
    }

    pub fn gpo_verification_needed(&self) -> bool {
        AddressResolver.gpo_verification_needed(&self.attributes)
    }

    /// Any one of: PII from the document, PII from the in-person flow, or a
    /// successful resolution.
    pub fn document_capture_complete(&self) -> bool {
        self.attributes
            .pii_from_doc
            .as_ref()
            .is_some_and(|pii| !pii.is_empty())
            || self.in_person_pii.is_some()
            || self.attributes.resolution_successful == Some(true)
    }

    pub fn verify_info_step_complete(&self) -> bool {
        self.attributes.resolution_successful == Some(true)
    }

    pub fn mark_verify_info_step_complete(&mut self) {
        self.attributes.resolution_successful = Some(true);
    }

    pub fn address_confirmed(&self) -> bool {
        self.attributes.gpo_code_verified == Some(true)
    }

    /// Record that the mailed code was entered correctly.
    pub fn confirm_address(&mut self) {
        self.attributes.gpo_code_verified = Some(true);
    }

    pub fn skip_hybrid_handoff(&self) -> bool {
        self.attributes.skip_hybrid_handoff == Some(true)
    }

    pub fn phone_otp_sent(&self) -> bool {
        self.otp_session.is_some()
    }

    pub fn otp_session(&self) -> Option<&PhoneOtpSession> {
        self.otp_session.as_ref()
    }

    pub fn set_otp_session(&mut self, otp: Option<PhoneOtpSession>) {
        self.otp_session = otp;
    }

    /// Applicant data handed to the resolution vendors: the applicant plus
    /// the user's uuid.
    pub fn vendor_params(&self, user: &User) -> Option<VendorParams> {
        self.attributes.applicant.as_ref().map(|applicant| VendorParams {
            applicant: applicant.clone(),
            uuid: user.id.to_string(),
        })
    }

    /// PII collected by the in-person proofing flow, if any.
    pub fn in_person_pii(&self) -> Option<&Pii> {
        self.in_person_pii.as_ref()
    }

    /// The personal key was shown to the user; forget it.
    pub fn acknowledge_personal_key(&mut self) {
        self.attributes.personal_key = None;
    }

    // ── Rejected phone numbers ─────────────────────────────────────────

    pub fn failed_phone_step_numbers(&self) -> &[E164Phone] {
        self.failed_phone_numbers.as_slice()
    }

    /// Remember a number the vendor rejected. Returns `Ok(false)` when its
    /// normalized form is already recorded.
    pub fn add_failed_phone_step_number(
        &mut self,
        raw: &str,
        normalizer: &impl PhoneNormalizer,
    ) -> Result<bool, TypeError> {
        self.failed_phone_numbers.add(raw, normalizer)
    }

    // ── Staged PII ─────────────────────────────────────────────────────

    pub fn has_staged_pii(&self) -> bool {
        self.staged_pii.as_ref().is_some_and(|staged| !staged.is_blank())
    }

    pub(crate) fn staged_pii(&self) -> Option<&StagedPii> {
        self.staged_pii.as_ref()
    }

    pub(crate) fn stage_pii(&mut self, staged: StagedPii) {
        self.staged_pii = Some(staged);
    }

    pub(crate) fn take_staged_pii(&mut self) -> Option<StagedPii> {
        self.staged_pii.take()
    }
}

/// Input for the identity-resolution vendors.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VendorParams {
    #[serde(flatten)]
    pub applicant: Applicant,
    pub uuid: String,
}

fn is_owned_key(key: &str) -> bool {
    key.parse::<Attribute>().is_ok()
        || matches!(
            key,
            STAGED_PII_KEY | OTP_SESSION_KEY | FAILED_PHONES_KEY | FLOW_NONCE_KEY
        )
}

fn read_key<T: DeserializeOwned>(values: &Map<String, Value>, key: &str) -> Option<T> {
    let value = values.get(key)?;
    match serde_json::from_value(value.clone()) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            warn!(key, error = %e, "dropping invalid stored session value");
            None
        }
    }
}

fn write_key<T: Serialize>(values: &mut Map<String, Value>, key: &str, value: &Option<T>) {
    if let Some(json) = value.as_ref().and_then(|v| serde_json::to_value(v).ok()) {
        values.insert(key.to_string(), json);
    }
}
