//! Nullable in-person enrollment service.

use idv_store::{EnrollmentStatus, InPersonEnrollment, InPersonEnrollments, StoreError, VendorError};
use idv_types::{Pii, ProfileId, UserId};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;

/// In-memory enrollments, one per user.
pub struct NullInPersonEnrollments {
    enrollments: Mutex<HashMap<UserId, InPersonEnrollment>>,
    next_id: AtomicU64,
    scheduled: Mutex<Vec<UserId>>,
    fail_scheduling: AtomicBool,
}

impl NullInPersonEnrollments {
    pub fn new() -> Self {
        Self {
            enrollments: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            scheduled: Mutex::new(Vec::new()),
            fail_scheduling: AtomicBool::new(false),
        }
    }

    /// Start an enrollment for `user` in the establishing state.
    pub fn open_enrollment(&self, user: UserId) -> InPersonEnrollment {
        let enrollment = InPersonEnrollment {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            user_id: user,
            profile_id: None,
            status: EnrollmentStatus::Establishing,
        };
        self.enrollments
            .lock()
            .unwrap()
            .insert(user, enrollment.clone());
        enrollment
    }

    pub fn enrollment(&self, user: &UserId) -> Option<InPersonEnrollment> {
        self.enrollments.lock().unwrap().get(user).cloned()
    }

    pub fn scheduled(&self) -> Vec<UserId> {
        self.scheduled.lock().unwrap().clone()
    }

    pub fn fail_scheduling(&self, fail: bool) {
        self.fail_scheduling.store(fail, Ordering::SeqCst);
    }
}

impl Default for NullInPersonEnrollments {
    fn default() -> Self {
        Self::new()
    }
}

impl InPersonEnrollments for NullInPersonEnrollments {
    fn establishing_enrollment(
        &self,
        user: &UserId,
    ) -> Result<Option<InPersonEnrollment>, StoreError> {
        Ok(self
            .enrollments
            .lock()
            .unwrap()
            .get(user)
            .filter(|e| e.status == EnrollmentStatus::Establishing)
            .cloned())
    }

    fn associate(
        &self,
        enrollment: &InPersonEnrollment,
        profile: ProfileId,
    ) -> Result<(), StoreError> {
        let mut enrollments = self.enrollments.lock().unwrap();
        let stored = enrollments
            .get_mut(&enrollment.user_id)
            .filter(|e| e.id == enrollment.id)
            .ok_or_else(|| StoreError::NotFound(format!("enrollment {}", enrollment.id)))?;
        stored.profile_id = Some(profile);
        Ok(())
    }

    fn schedule_enrollment(&self, user: &UserId, _pii: &Pii) -> Result<(), VendorError> {
        if self.fail_scheduling.load(Ordering::SeqCst) {
            return Err(VendorError::Timeout);
        }
        let mut enrollments = self.enrollments.lock().unwrap();
        let enrollment = enrollments
            .get_mut(user)
            .ok_or_else(|| VendorError::Rejected("no enrollment for user".to_string()))?;
        enrollment.status = EnrollmentStatus::Pending;
        self.scheduled.lock().unwrap().push(*user);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn associate_then_schedule() {
        let service = NullInPersonEnrollments::new();
        let user = UserId::random();
        let enrollment = service.open_enrollment(user);

        let found = service.establishing_enrollment(&user).unwrap().unwrap();
        assert_eq!(found, enrollment);

        service.associate(&enrollment, ProfileId::new(9)).unwrap();
        service.schedule_enrollment(&user, &Pii::default()).unwrap();

        let stored = service.enrollment(&user).unwrap();
        assert_eq!(stored.profile_id, Some(ProfileId::new(9)));
        assert_eq!(stored.status, EnrollmentStatus::Pending);
        // no longer establishing
        assert!(service.establishing_enrollment(&user).unwrap().is_none());
    }

    #[test]
    fn no_enrollment_means_none() {
        let service = NullInPersonEnrollments::new();
        assert!(service.establishing_enrollment(&UserId::random()).unwrap().is_none());
    }
}
