//! In-person enrollment service trait.

use crate::{StoreError, VendorError};
use idv_types::{Pii, ProfileId, UserId};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnrollmentStatus {
    /// Created during the flow, not yet handed to the vendor.
    Establishing,
    /// Scheduled with the vendor; awaiting the visit.
    Pending,
    Passed,
    Failed,
    Expired,
}

/// An enrollment for proofing at a physical retail location.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InPersonEnrollment {
    pub id: u64,
    pub user_id: UserId,
    pub profile_id: Option<ProfileId>,
    pub status: EnrollmentStatus,
}

/// Trait for the in-person enrollment collaborator.
pub trait InPersonEnrollments {
    /// The user's enrollment that is still being established, if any.
    fn establishing_enrollment(
        &self,
        user: &UserId,
    ) -> Result<Option<InPersonEnrollment>, StoreError>;

    /// Link an enrollment to a newly created profile.
    fn associate(
        &self,
        enrollment: &InPersonEnrollment,
        profile: ProfileId,
    ) -> Result<(), StoreError>;

    /// Hand the enrollment to the vendor for scheduling.
    fn schedule_enrollment(&self, user: &UserId, pii: &Pii) -> Result<(), VendorError>;
}
