//! Fundamental types for identity-verification (IdV) sessions.
//!
//! This crate defines the core types shared across every other crate in the workspace:
//! identifiers, applicant/PII records, phone numbers, secrets, timestamps and state enums.

pub mod error;
pub mod ids;
pub mod phone;
pub mod pii;
pub mod secret;
pub mod state;
pub mod time;

pub use error::TypeError;
pub use ids::{IdempotencyKey, ProfileId, ServiceProvider, SessionId, User, UserId};
pub use phone::{E164Phone, OtpDeliveryMethod, PhoneStepParams};
pub use pii::{Applicant, CacheToken, Pii, PiiPayload};
pub use secret::{Password, PersonalKey};
pub use state::{AddressMechanism, FlowPath, FraudPendingReason, ThreatMetrixReviewStatus};
pub use time::Timestamp;
