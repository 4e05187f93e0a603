//! Shared utilities for IdV sessions.

pub mod logging;
pub mod phone;

pub use logging::{init_logging, LogFormat};
pub use phone::NanpPhoneNormalizer;
