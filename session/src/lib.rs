//! Identity-verification (IdV) session state machine.
//!
//! Tracks a user's progress through the proofing flow and, at the final
//! step, creates and conditionally activates the resulting profile:
//!
//! 1. **Session attributes**: a closed, typed set of step results scoped to
//!    one browser session ([`IdvSession`], [`Attribute`]).
//! 2. **Address resolution**: phone possession versus a mailed ("GPO") code
//!    ([`AddressResolver`]).
//! 3. **Profile creation**: draft, persist, activate, then run the confirmation
//!    path still needed ([`ProfileOrchestrator`]).
//! 4. **Step invalidation**: changing an earlier step clears the later ones
//!    ([`StepInvalidator`]).
//! 5. **PII relocation**: staged decrypted PII moves into the durable
//!    encrypted cache exactly once ([`PiiRelocator`]).
//!
//! Collaborators (profile store, PII cache, mail-code generator, in-person
//! enrollment) are the traits in `idv_store`.

pub mod address;
pub mod attributes;
pub mod config;
pub mod error;
pub mod invalidation;
pub mod orchestrator;
pub mod phone;
pub mod profile_maker;
pub mod relocation;
pub mod session;
pub mod state;
pub mod tracing_spans;

pub use address::AddressResolver;
pub use attributes::{Attribute, SessionAttributes};
pub use config::{ConfigError, IdvConfig, UnknownAttributePolicy};
pub use error::SessionError;
pub use invalidation::{InvalidationOutcome, StepInvalidator};
pub use orchestrator::{IdvEvent, ProfileOrchestrator, ProfileOutcome};
pub use phone::{FailedPhoneNumbers, PhoneConfirmation, PhoneOtpSession};
pub use profile_maker::{ProfileFlags, ProfileMaker};
pub use relocation::PiiRelocator;
pub use session::{IdvSession, UserSession, VendorParams};
pub use state::{IdvPhase, ProfileStatus};
