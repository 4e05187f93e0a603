//! Moves staged decrypted PII into the durable encrypted cache.

use crate::error::SessionError;
use crate::session::IdvSession;
use crate::tracing_spans::pii_relocate_span;
use idv_store::PiiCache;
use idv_types::UserId;
use tracing::{debug, info};

pub struct PiiRelocator<'a, C> {
    cache: &'a C,
}

impl<'a, C: PiiCache> PiiRelocator<'a, C> {
    pub fn new(cache: &'a C) -> Self {
        Self { cache }
    }

    /// Persist the staged payload under the session's profile, then drop it
    /// from the session.
    ///
    /// Returns `Ok(false)` without touching the cache when nothing is staged,
    /// so a second call after a successful relocation is a no-op. On failure
    /// the payload stays staged and the call can be retried.
    pub fn relocate_pii(
        &self,
        session: &mut IdvSession,
        user: &UserId,
    ) -> Result<bool, SessionError> {
        if !session.has_staged_pii() {
            return Ok(false);
        }
        let Some(profile_id) = session.profile_id() else {
            debug!("staged PII without a profile; nothing to relocate into");
            return Ok(false);
        };
        let _span = pii_relocate_span(profile_id).entered();

        if let Some(staged) = session.staged_pii() {
            self.cache
                .save_decrypted(user, profile_id, staged)
                .map_err(SessionError::PiiRelocationFailed)?;
        }
        session.take_staged_pii();
        info!("PII relocated to durable cache");
        Ok(true)
    }
}
