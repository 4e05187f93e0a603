//! Nullable infrastructure for deterministic testing.
//!
//! Every collaborator of the IdV session (profile storage, PII cache,
//! mailed-code generator, in-person enrollment) is abstracted behind a
//! trait in `idv_store`. This crate provides test-friendly implementations
//! that:
//! - Return deterministic values
//! - Can be told to fail on demand
//! - Record what was asked of them
//! - Never touch the filesystem or network
//!
//! Usage: swap real implementations for nullables in tests.

pub mod clock;
pub mod gpo;
pub mod in_person;
pub mod pii_cache;
pub mod profile_store;

pub use clock::NullClock;
pub use gpo::{IssuedLetter, NullGpoConfirmationMaker};
pub use in_person::NullInPersonEnrollments;
pub use pii_cache::NullPiiCache;
pub use profile_store::{NullProfileStore, NullWriteTxn};
