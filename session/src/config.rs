//! Session configuration with TOML file support.

use idv_crypto::KdfParams;
use idv_utils::{LogFormat, NanpPhoneNormalizer};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file: {0}")]
    Io(String),

    #[error("invalid config: {0}")]
    Parse(String),

    #[error("cannot serialize config: {0}")]
    Serialize(String),
}

/// What by-name accessors do with a name outside the attribute allow-list.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownAttributePolicy {
    /// Fail with `SessionError::UnknownAttribute`.
    #[default]
    Reject,
    /// Log a warning and treat the access as a no-op.
    LogAndIgnore,
}

/// Configuration for the IdV session component.
///
/// Can be loaded from a TOML file via [`IdvConfig::from_toml_file`] or
/// built programmatically (e.g. for tests).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IdvConfig {
    /// Hold profiles for fraud review based on the device-profiling status.
    #[serde(default)]
    pub device_profiling_decisioning_enabled: bool,

    #[serde(default)]
    pub unknown_attribute_policy: UnknownAttributePolicy,

    /// Key of the IdV namespace inside the user session.
    #[serde(default = "default_session_namespace")]
    pub session_namespace: String,

    /// Key of the in-person proofing namespace inside the user session.
    #[serde(default = "default_in_person_namespace")]
    pub in_person_namespace: String,

    /// Country code assumed for phone numbers entered without one.
    #[serde(default = "default_phone_country_code")]
    pub default_phone_country_code: String,

    /// Argon2id memory cost for PII encryption, in KiB.
    #[serde(default = "default_kdf_memory_kib")]
    pub pii_kdf_memory_kib: u32,

    #[serde(default = "default_kdf_iterations")]
    pub pii_kdf_iterations: u32,

    #[serde(default = "default_kdf_parallelism")]
    pub pii_kdf_parallelism: u32,

    #[serde(default)]
    pub log_format: LogFormat,

    /// Log level filter (e.g. "info", "debug,idv_session=trace").
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

// ── Defaults ───────────────────────────────────────────────────────────

fn default_session_namespace() -> String {
    "idv".to_string()
}

fn default_in_person_namespace() -> String {
    "idv/in_person".to_string()
}

fn default_phone_country_code() -> String {
    "1".to_string()
}

fn default_kdf_memory_kib() -> u32 {
    KdfParams::default().memory_kib
}

fn default_kdf_iterations() -> u32 {
    KdfParams::default().iterations
}

fn default_kdf_parallelism() -> u32 {
    KdfParams::default().parallelism
}

fn default_log_level() -> String {
    "info".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl IdvConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))
    }

    pub fn kdf_params(&self) -> KdfParams {
        KdfParams {
            memory_kib: self.pii_kdf_memory_kib,
            iterations: self.pii_kdf_iterations,
            parallelism: self.pii_kdf_parallelism,
        }
    }

    pub fn phone_normalizer(&self) -> NanpPhoneNormalizer {
        NanpPhoneNormalizer::new(self.default_phone_country_code.clone())
    }

    /// Defaults with a cheap KDF. Never use outside tests.
    pub fn for_tests() -> Self {
        let fast = KdfParams::insecure_fast();
        Self {
            pii_kdf_memory_kib: fast.memory_kib,
            pii_kdf_iterations: fast.iterations,
            pii_kdf_parallelism: fast.parallelism,
            ..Self::default()
        }
    }
}

impl Default for IdvConfig {
    fn default() -> Self {
        Self {
            device_profiling_decisioning_enabled: false,
            unknown_attribute_policy: UnknownAttributePolicy::default(),
            session_namespace: default_session_namespace(),
            in_person_namespace: default_in_person_namespace(),
            default_phone_country_code: default_phone_country_code(),
            pii_kdf_memory_kib: default_kdf_memory_kib(),
            pii_kdf_iterations: default_kdf_iterations(),
            pii_kdf_parallelism: default_kdf_parallelism(),
            log_format: LogFormat::default(),
            log_level: default_log_level(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config_round_trips_through_toml() {
        let config = IdvConfig::default();
        let toml_str = config.to_toml_string().unwrap();
        let parsed = IdvConfig::from_toml_str(&toml_str).expect("should parse");
        assert_eq!(parsed, config);
    }

    #[test]
    fn minimal_toml_uses_defaults() {
        let config = IdvConfig::from_toml_str("").expect("empty toml should use defaults");
        assert!(!config.device_profiling_decisioning_enabled);
        assert_eq!(config.unknown_attribute_policy, UnknownAttributePolicy::Reject);
        assert_eq!(config.session_namespace, "idv");
        assert_eq!(config.in_person_namespace, "idv/in_person");
        assert_eq!(config.kdf_params(), KdfParams::default());
    }

    #[test]
    fn partial_toml_overrides() {
        let toml = r#"
            device_profiling_decisioning_enabled = true
            unknown_attribute_policy = "log_and_ignore"
            log_format = "json"
        "#;
        let config = IdvConfig::from_toml_str(toml).expect("should parse");
        assert!(config.device_profiling_decisioning_enabled);
        assert_eq!(config.unknown_attribute_policy, UnknownAttributePolicy::LogAndIgnore);
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.log_level, "info"); // default
    }

    #[test]
    fn unknown_policy_value_is_parse_error() {
        let err = IdvConfig::from_toml_str(r#"unknown_attribute_policy = "shrug""#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "default_phone_country_code = \"44\"").unwrap();
        let config = IdvConfig::from_toml_file(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.default_phone_country_code, "44");
    }

    #[test]
    fn missing_file_returns_config_error() {
        let err = IdvConfig::from_toml_file("/nonexistent/idv.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
