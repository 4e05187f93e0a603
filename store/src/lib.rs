//! Abstract collaborator traits for the IdV session state machine.
//!
//! Every backend (SQL, external vendors, in-memory for testing) implements
//! these traits. The session crate depends only on the traits.

pub mod error;
pub mod gpo;
pub mod in_person;
pub mod pii_cache;
pub mod phone;
pub mod profile;

pub use error::{StoreError, VendorError};
pub use gpo::{GpoConfirmationMaker, GpoOtp};
pub use in_person::{EnrollmentStatus, InPersonEnrollment, InPersonEnrollments};
pub use pii_cache::{PiiCache, StagedPii};
pub use phone::PhoneNormalizer;
pub use profile::{
    Activation, PendingReason, Profile, ProfileDraft, ProfileStore, ProfileWriteTxn,
};
