//! Nullable mailed-code generator.

use idv_store::{GpoConfirmationMaker, GpoOtp, Profile, VendorError};
use idv_types::{Pii, ProfileId, ServiceProvider};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;

/// A letter the generator was asked to send.
#[derive(Clone, Debug)]
pub struct IssuedLetter {
    pub profile_id: ProfileId,
    pub service_provider: Option<ServiceProvider>,
    pub otp: GpoOtp,
}

/// Issues sequential codes (`GPO0000001`, `GPO0000002`, ...) and records them.
pub struct NullGpoConfirmationMaker {
    issued: Mutex<Vec<IssuedLetter>>,
    sequence: AtomicU64,
    fail: AtomicBool,
}

impl NullGpoConfirmationMaker {
    pub fn new() -> Self {
        Self {
            issued: Mutex::new(Vec::new()),
            sequence: AtomicU64::new(1),
            fail: AtomicBool::new(false),
        }
    }

    pub fn fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn issued(&self) -> Vec<IssuedLetter> {
        self.issued.lock().unwrap().clone()
    }

    pub fn issued_for(&self, profile_id: ProfileId) -> usize {
        self.issued
            .lock()
            .unwrap()
            .iter()
            .filter(|letter| letter.profile_id == profile_id)
            .count()
    }
}

impl Default for NullGpoConfirmationMaker {
    fn default() -> Self {
        Self::new()
    }
}

impl GpoConfirmationMaker for NullGpoConfirmationMaker {
    fn generate(
        &self,
        _pii: &Pii,
        service_provider: Option<&ServiceProvider>,
        profile: &Profile,
    ) -> Result<GpoOtp, VendorError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(VendorError::Unavailable("injected gpo failure".to_string()));
        }
        let n = self.sequence.fetch_add(1, Ordering::SeqCst);
        let otp = GpoOtp::new(format!("GPO{n:07}"));
        self.issued.lock().unwrap().push(IssuedLetter {
            profile_id: profile.id,
            service_provider: service_provider.cloned(),
            otp: otp.clone(),
        });
        Ok(otp)
    }
}
