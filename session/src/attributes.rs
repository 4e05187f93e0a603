//! The closed set of IdV session attributes.
//!
//! Attribute names are an allow-list: anything outside [`Attribute::ALL`] is
//! rejected (or ignored, depending on policy) and never read from or written
//! to the backing session. Values are typed; the by-name accessors convert to
//! and from JSON at the boundary.

use crate::error::SessionError;
use crate::phone::PhoneConfirmation;
use idv_types::{
    AddressMechanism, Applicant, FlowPath, PersonalKey, PhoneStepParams, Pii, PiiPayload,
    ProfileId, ThreatMetrixReviewStatus,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// A recognized session attribute name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Attribute {
    AddressEdited,
    AddressVerificationMechanism,
    Applicant,
    DocumentCaptureSessionUuid,
    FlowPath,
    GoBackPath,
    GpoCodeVerified,
    HadBarcodeAttentionError,
    HadBarcodeReadFailure,
    IdvConsentGiven,
    IdvPhoneStepDocumentCaptureSessionUuid,
    MailOnlyWarningShown,
    PersonalKey,
    PhoneForMobileFlow,
    PhoneWithCamera,
    Pii,
    PiiFromDoc,
    PreviousPhoneStepParams,
    ProfileId,
    RedoDocumentCapture,
    ResolutionSuccessful,
    SkipHybridHandoff,
    Ssn,
    ThreatmetrixReviewStatus,
    ThreatmetrixSessionId,
    UserPhoneConfirmation,
    VendorPhoneConfirmation,
    VerifyInfoStepDocumentCaptureSessionUuid,
    WelcomeVisited,
}

impl Attribute {
    pub const ALL: [Attribute; 29] = [
        Self::AddressEdited,
        Self::AddressVerificationMechanism,
        Self::Applicant,
        Self::DocumentCaptureSessionUuid,
        Self::FlowPath,
        Self::GoBackPath,
        Self::GpoCodeVerified,
        Self::HadBarcodeAttentionError,
        Self::HadBarcodeReadFailure,
        Self::IdvConsentGiven,
        Self::IdvPhoneStepDocumentCaptureSessionUuid,
        Self::MailOnlyWarningShown,
        Self::PersonalKey,
        Self::PhoneForMobileFlow,
        Self::PhoneWithCamera,
        Self::Pii,
        Self::PiiFromDoc,
        Self::PreviousPhoneStepParams,
        Self::ProfileId,
        Self::RedoDocumentCapture,
        Self::ResolutionSuccessful,
        Self::SkipHybridHandoff,
        Self::Ssn,
        Self::ThreatmetrixReviewStatus,
        Self::ThreatmetrixSessionId,
        Self::UserPhoneConfirmation,
        Self::VendorPhoneConfirmation,
        Self::VerifyInfoStepDocumentCaptureSessionUuid,
        Self::WelcomeVisited,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::AddressEdited => "address_edited",
            Self::AddressVerificationMechanism => "address_verification_mechanism",
            Self::Applicant => "applicant",
            Self::DocumentCaptureSessionUuid => "document_capture_session_uuid",
            Self::FlowPath => "flow_path",
            Self::GoBackPath => "go_back_path",
            Self::GpoCodeVerified => "gpo_code_verified",
            Self::HadBarcodeAttentionError => "had_barcode_attention_error",
            Self::HadBarcodeReadFailure => "had_barcode_read_failure",
            Self::IdvConsentGiven => "idv_consent_given",
            Self::IdvPhoneStepDocumentCaptureSessionUuid => {
                "idv_phone_step_document_capture_session_uuid"
            }
            Self::MailOnlyWarningShown => "mail_only_warning_shown",
            Self::PersonalKey => "personal_key",
            Self::PhoneForMobileFlow => "phone_for_mobile_flow",
            Self::PhoneWithCamera => "phone_with_camera",
            Self::Pii => "pii",
            Self::PiiFromDoc => "pii_from_doc",
            Self::PreviousPhoneStepParams => "previous_phone_step_params",
            Self::ProfileId => "profile_id",
            Self::RedoDocumentCapture => "redo_document_capture",
            Self::ResolutionSuccessful => "resolution_successful",
            Self::SkipHybridHandoff => "skip_hybrid_handoff",
            Self::Ssn => "ssn",
            Self::ThreatmetrixReviewStatus => "threatmetrix_review_status",
            Self::ThreatmetrixSessionId => "threatmetrix_session_id",
            Self::UserPhoneConfirmation => "user_phone_confirmation",
            Self::VendorPhoneConfirmation => "vendor_phone_confirmation",
            Self::VerifyInfoStepDocumentCaptureSessionUuid => {
                "verify_info_step_document_capture_session_uuid"
            }
            Self::WelcomeVisited => "welcome_visited",
        }
    }

    /// Attributes that carry PII. Their values never appear in logs.
    pub fn is_sensitive(self) -> bool {
        matches!(
            self,
            Self::Applicant
                | Self::PersonalKey
                | Self::Pii
                | Self::PiiFromDoc
                | Self::Ssn
                | Self::PhoneForMobileFlow
                | Self::PreviousPhoneStepParams
        )
    }
}

impl FromStr for Attribute {
    type Err = SessionError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|attr| attr.name() == name)
            .ok_or_else(|| SessionError::UnknownAttribute(name.to_string()))
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Typed values for every [`Attribute`].
///
/// `vendor_phone_confirmation` and `user_phone_confirmation` share a single
/// [`PhoneConfirmation`] field so they cannot disagree.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SessionAttributes {
    pub address_edited: Option<bool>,
    pub address_verification_mechanism: Option<AddressMechanism>,
    pub applicant: Option<Applicant>,
    pub document_capture_session_uuid: Option<Uuid>,
    pub flow_path: Option<FlowPath>,
    pub go_back_path: Option<String>,
    pub gpo_code_verified: Option<bool>,
    pub had_barcode_attention_error: Option<bool>,
    pub had_barcode_read_failure: Option<bool>,
    pub idv_consent_given: Option<bool>,
    pub idv_phone_step_document_capture_session_uuid: Option<Uuid>,
    pub mail_only_warning_shown: Option<bool>,
    pub personal_key: Option<PersonalKey>,
    pub phone_for_mobile_flow: Option<String>,
    pub phone_with_camera: Option<bool>,
    pub pii: Option<PiiPayload>,
    pub pii_from_doc: Option<Pii>,
    pub previous_phone_step_params: Option<PhoneStepParams>,
    profile_id: Option<ProfileId>,
    pub redo_document_capture: Option<bool>,
    pub resolution_successful: Option<bool>,
    pub skip_hybrid_handoff: Option<bool>,
    pub ssn: Option<String>,
    pub threatmetrix_review_status: Option<ThreatMetrixReviewStatus>,
    pub threatmetrix_session_id: Option<String>,
    pub phone_confirmation: PhoneConfirmation,
    pub verify_info_step_document_capture_session_uuid: Option<Uuid>,
    pub welcome_visited: Option<bool>,
}

impl SessionAttributes {
    pub fn profile_id(&self) -> Option<ProfileId> {
        self.profile_id
    }

    /// Record the profile created for this session.
    ///
    /// The id is write-once: assigning a different id, or clearing it, fails
    /// with [`SessionError::ProfileAlreadyCreated`].
    pub fn set_profile_id(&mut self, id: Option<ProfileId>) -> Result<(), SessionError> {
        match self.profile_id {
            Some(existing) if id != Some(existing) => {
                Err(SessionError::ProfileAlreadyCreated(existing))
            }
            _ => {
                self.profile_id = id;
                Ok(())
            }
        }
    }

    /// Current value of `attr` as JSON. Unset attributes read as `None`.
    pub fn get(&self, attr: Attribute) -> Option<Value> {
        match attr {
            Attribute::AddressEdited => encode(&self.address_edited),
            Attribute::AddressVerificationMechanism => encode(&self.address_verification_mechanism),
            Attribute::Applicant => encode(&self.applicant),
            Attribute::DocumentCaptureSessionUuid => encode(&self.document_capture_session_uuid),
            Attribute::FlowPath => encode(&self.flow_path),
            Attribute::GoBackPath => encode(&self.go_back_path),
            Attribute::GpoCodeVerified => encode(&self.gpo_code_verified),
            Attribute::HadBarcodeAttentionError => encode(&self.had_barcode_attention_error),
            Attribute::HadBarcodeReadFailure => encode(&self.had_barcode_read_failure),
            Attribute::IdvConsentGiven => encode(&self.idv_consent_given),
            Attribute::IdvPhoneStepDocumentCaptureSessionUuid => {
                encode(&self.idv_phone_step_document_capture_session_uuid)
            }
            Attribute::MailOnlyWarningShown => encode(&self.mail_only_warning_shown),
            Attribute::PersonalKey => encode(&self.personal_key),
            Attribute::PhoneForMobileFlow => encode(&self.phone_for_mobile_flow),
            Attribute::PhoneWithCamera => encode(&self.phone_with_camera),
            Attribute::Pii => encode(&self.pii),
            Attribute::PiiFromDoc => encode(&self.pii_from_doc),
            Attribute::PreviousPhoneStepParams => encode(&self.previous_phone_step_params),
            Attribute::ProfileId => encode(&self.profile_id),
            Attribute::RedoDocumentCapture => encode(&self.redo_document_capture),
            Attribute::ResolutionSuccessful => encode(&self.resolution_successful),
            Attribute::SkipHybridHandoff => encode(&self.skip_hybrid_handoff),
            Attribute::Ssn => encode(&self.ssn),
            Attribute::ThreatmetrixReviewStatus => encode(&self.threatmetrix_review_status),
            Attribute::ThreatmetrixSessionId => encode(&self.threatmetrix_session_id),
            Attribute::UserPhoneConfirmation => encode(&self.phone_confirmation.user()),
            Attribute::VendorPhoneConfirmation => encode(&self.phone_confirmation.vendor()),
            Attribute::VerifyInfoStepDocumentCaptureSessionUuid => {
                encode(&self.verify_info_step_document_capture_session_uuid)
            }
            Attribute::WelcomeVisited => encode(&self.welcome_visited),
        }
    }

    /// Assign `attr` from JSON. `None` or JSON `null` clears it.
    ///
    /// `user_phone_confirmation` accepts only `true` (on top of a vendor
    /// confirmation) or `null`; anything else is
    /// [`SessionError::InvalidAttributeValue`].
    pub fn set(&mut self, attr: Attribute, value: Option<Value>) -> Result<(), SessionError> {
        match attr {
            Attribute::AddressEdited => self.address_edited = decode(attr, value)?,
            Attribute::AddressVerificationMechanism => {
                self.address_verification_mechanism = decode(attr, value)?
            }
            Attribute::Applicant => self.applicant = decode(attr, value)?,
            Attribute::DocumentCaptureSessionUuid => {
                self.document_capture_session_uuid = decode(attr, value)?
            }
            Attribute::FlowPath => self.flow_path = decode(attr, value)?,
            Attribute::GoBackPath => self.go_back_path = decode(attr, value)?,
            Attribute::GpoCodeVerified => self.gpo_code_verified = decode(attr, value)?,
            Attribute::HadBarcodeAttentionError => {
                self.had_barcode_attention_error = decode(attr, value)?
            }
            Attribute::HadBarcodeReadFailure => {
                self.had_barcode_read_failure = decode(attr, value)?
            }
            Attribute::IdvConsentGiven => self.idv_consent_given = decode(attr, value)?,
            Attribute::IdvPhoneStepDocumentCaptureSessionUuid => {
                self.idv_phone_step_document_capture_session_uuid = decode(attr, value)?
            }
            Attribute::MailOnlyWarningShown => self.mail_only_warning_shown = decode(attr, value)?,
            Attribute::PersonalKey => self.personal_key = decode(attr, value)?,
            Attribute::PhoneForMobileFlow => self.phone_for_mobile_flow = decode(attr, value)?,
            Attribute::PhoneWithCamera => self.phone_with_camera = decode(attr, value)?,
            Attribute::Pii => self.pii = decode(attr, value)?,
            Attribute::PiiFromDoc => self.pii_from_doc = decode(attr, value)?,
            Attribute::PreviousPhoneStepParams => {
                self.previous_phone_step_params = decode(attr, value)?
            }
            Attribute::ProfileId => {
                let id = decode(attr, value)?;
                self.set_profile_id(id)?;
            }
            Attribute::RedoDocumentCapture => self.redo_document_capture = decode(attr, value)?,
            Attribute::ResolutionSuccessful => self.resolution_successful = decode(attr, value)?,
            Attribute::SkipHybridHandoff => self.skip_hybrid_handoff = decode(attr, value)?,
            Attribute::Ssn => self.ssn = decode(attr, value)?,
            Attribute::ThreatmetrixReviewStatus => {
                self.threatmetrix_review_status = decode(attr, value)?
            }
            Attribute::ThreatmetrixSessionId => {
                self.threatmetrix_session_id = decode(attr, value)?
            }
            Attribute::UserPhoneConfirmation => {
                let confirmed: Option<bool> = decode(attr, value)?;
                self.phone_confirmation = self
                    .phone_confirmation
                    .with_user(confirmed)
                    .ok_or_else(|| SessionError::InvalidAttributeValue {
                        attribute: attr.name().to_string(),
                        reason: match confirmed {
                            Some(false) => "only true or null is recorded".to_string(),
                            _ => "phone is not vendor-confirmed".to_string(),
                        },
                    })?;
            }
            Attribute::VendorPhoneConfirmation => {
                let confirmed = decode(attr, value)?;
                self.phone_confirmation = self.phone_confirmation.with_vendor(confirmed);
            }
            Attribute::VerifyInfoStepDocumentCaptureSessionUuid => {
                self.verify_info_step_document_capture_session_uuid = decode(attr, value)?
            }
            Attribute::WelcomeVisited => self.welcome_visited = decode(attr, value)?,
        }
        Ok(())
    }

    pub fn is_set(&self, attr: Attribute) -> bool {
        self.get(attr).is_some()
    }

    /// Every attribute that currently holds a value, in [`Attribute::ALL`] order.
    pub fn iter_set(&self) -> impl Iterator<Item = (Attribute, Value)> + '_ {
        Attribute::ALL
            .iter()
            .filter_map(move |&attr| self.get(attr).map(|value| (attr, value)))
    }
}

fn encode<T: Serialize>(value: &Option<T>) -> Option<Value> {
    value
        .as_ref()
        .and_then(|inner| serde_json::to_value(inner).ok())
        .filter(|json| !json.is_null())
}

fn decode<T: DeserializeOwned>(
    attr: Attribute,
    value: Option<Value>,
) -> Result<Option<T>, SessionError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(json) => serde_json::from_value(json).map(Some).map_err(|e| {
            SessionError::InvalidAttributeValue {
                attribute: attr.name().to_string(),
                reason: e.to_string(),
            }
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn names_round_trip_through_from_str() {
        for attr in Attribute::ALL {
            assert_eq!(attr.name().parse::<Attribute>().unwrap(), attr);
        }
    }

    #[test]
    fn unknown_name_is_rejected() {
        let err = "foo".parse::<Attribute>().unwrap_err();
        assert!(matches!(err, SessionError::UnknownAttribute(name) if name == "foo"));
    }

    #[test]
    fn unset_reads_as_none() {
        let attrs = SessionAttributes::default();
        for attr in Attribute::ALL {
            assert_eq!(attrs.get(attr), None, "{attr} should be unset");
        }
        assert_eq!(attrs.iter_set().count(), 0);
    }

    #[test]
    fn typed_values_survive_json_boundary() {
        let mut attrs = SessionAttributes::default();
        attrs
            .set(Attribute::AddressVerificationMechanism, Some(json!("gpo")))
            .unwrap();
        attrs.set(Attribute::Ssn, Some(json!("900-12-3456"))).unwrap();
        assert_eq!(attrs.address_verification_mechanism, Some(AddressMechanism::Gpo));
        assert_eq!(attrs.get(Attribute::Ssn), Some(json!("900-12-3456")));
    }

    #[test]
    fn wrong_type_is_invalid_value() {
        let mut attrs = SessionAttributes::default();
        let err = attrs
            .set(Attribute::ResolutionSuccessful, Some(json!("yes")))
            .unwrap_err();
        assert!(matches!(err, SessionError::InvalidAttributeValue { attribute, .. }
            if attribute == "resolution_successful"));
        assert_eq!(attrs.resolution_successful, None);
    }

    #[test]
    fn null_clears() {
        let mut attrs = SessionAttributes {
            welcome_visited: Some(true),
            ..Default::default()
        };
        attrs.set(Attribute::WelcomeVisited, Some(Value::Null)).unwrap();
        assert_eq!(attrs.welcome_visited, None);
    }

    #[test]
    fn pii_string_is_cache_reference() {
        let mut attrs = SessionAttributes::default();
        attrs.set(Attribute::Pii, Some(json!("cache-token-1"))).unwrap();
        assert!(attrs.pii.as_ref().unwrap().is_cache_reference());

        attrs
            .set(Attribute::Pii, Some(json!({ "first_name": "Fakey" })))
            .unwrap();
        let inline = attrs.pii.as_ref().unwrap().inline().unwrap();
        assert_eq!(inline.first_name.as_deref(), Some("Fakey"));
    }

    #[test]
    fn profile_id_is_write_once() {
        let mut attrs = SessionAttributes::default();
        attrs.set(Attribute::ProfileId, Some(json!(7))).unwrap();
        // same value again is fine
        attrs.set(Attribute::ProfileId, Some(json!(7))).unwrap();

        let err = attrs.set(Attribute::ProfileId, Some(json!(8))).unwrap_err();
        assert!(matches!(err, SessionError::ProfileAlreadyCreated(id) if id == ProfileId::new(7)));
        assert!(attrs.set(Attribute::ProfileId, None).is_err());
        assert_eq!(attrs.profile_id(), Some(ProfileId::new(7)));
    }

    #[test]
    fn user_phone_confirmation_needs_vendor_first() {
        let mut attrs = SessionAttributes::default();
        assert!(attrs
            .set(Attribute::UserPhoneConfirmation, Some(json!(true)))
            .is_err());

        attrs
            .set(Attribute::VendorPhoneConfirmation, Some(json!(true)))
            .unwrap();
        attrs
            .set(Attribute::UserPhoneConfirmation, Some(json!(true)))
            .unwrap();
        assert!(attrs.phone_confirmation.is_confirmed());
        assert_eq!(attrs.get(Attribute::UserPhoneConfirmation), Some(json!(true)));
    }

    #[test]
    fn user_phone_confirmation_false_is_rejected_not_dropped() {
        let mut attrs = SessionAttributes::default();
        attrs
            .set(Attribute::VendorPhoneConfirmation, Some(json!(true)))
            .unwrap();
        let err = attrs
            .set(Attribute::UserPhoneConfirmation, Some(json!(false)))
            .unwrap_err();
        assert!(matches!(
            err,
            SessionError::InvalidAttributeValue { ref attribute, .. } if attribute == "user_phone_confirmation"
        ));
        assert_eq!(attrs.phone_confirmation, PhoneConfirmation::VendorConfirmed);
    }

    #[test]
    fn personal_key_validated_on_set() {
        let mut attrs = SessionAttributes::default();
        assert!(attrs.set(Attribute::PersonalKey, Some(json!("nope"))).is_err());
        attrs
            .set(Attribute::PersonalKey, Some(json!("abcd-efgh-jkmn-pqrs")))
            .unwrap();
        assert_eq!(
            attrs.get(Attribute::PersonalKey),
            Some(json!("ABCD-EFGH-JKMN-PQRS"))
        );
    }
}
