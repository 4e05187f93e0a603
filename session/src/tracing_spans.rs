//! Span constructors for the IdV flow.
//!
//! Fields carry identifiers only, never PII.

use idv_types::{ProfileId, SessionId, UserId};
use tracing::{info_span, Span};

/// One step controller's unit of work against the session.
pub fn idv_step_span(step: &'static str, session: &SessionId) -> Span {
    info_span!("idv_step", step, session = %session)
}

pub fn profile_create_span(user: &UserId) -> Span {
    info_span!("profile_create", user = %user, profile_id = tracing::field::Empty)
}

pub fn pii_relocate_span(profile_id: ProfileId) -> Span {
    info_span!("pii_relocate", %profile_id)
}
