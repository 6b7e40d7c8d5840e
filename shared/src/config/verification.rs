//! Verification code configuration module

use serde::{Deserialize, Serialize};

use super::{parse_var, ConfigError};

/// Default number of digits in a verification code
pub const DEFAULT_CODE_LENGTH: usize = 6;

/// Largest code length accepted by validation
pub const MAX_CODE_LENGTH: usize = 12;

/// Verification code cache configuration
///
/// All values are fixed when the verification service is constructed.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct VerificationCodeConfig {
    /// Number of digits in an issued code
    #[serde(default = "default_code_length")]
    pub code_length: usize,

    /// Seconds a code stays valid after issuance
    #[serde(default = "default_ttl_seconds")]
    pub ttl_seconds: u64,

    /// Seconds between two sweeper passes
    #[serde(default = "default_sweep_interval_seconds")]
    pub sweep_interval_seconds: u64,

    /// Seconds to wait for a running sweep pass on shutdown before aborting it
    #[serde(default = "default_shutdown_grace_seconds")]
    pub shutdown_grace_seconds: u64,
}

impl Default for VerificationCodeConfig {
    fn default() -> Self {
        Self {
            code_length: default_code_length(),
            ttl_seconds: default_ttl_seconds(),
            sweep_interval_seconds: default_sweep_interval_seconds(),
            shutdown_grace_seconds: default_shutdown_grace_seconds(),
        }
    }
}

impl VerificationCodeConfig {
    /// Create from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create from an arbitrary key lookup, falling back to defaults for missing keys
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let config = Self {
            code_length: parse_var(&lookup, "VERIFICATION_CODE_LENGTH", defaults.code_length)?,
            ttl_seconds: parse_var(&lookup, "VERIFICATION_CODE_TTL_SECONDS", defaults.ttl_seconds)?,
            sweep_interval_seconds: parse_var(
                &lookup,
                "VERIFICATION_SWEEP_INTERVAL_SECONDS",
                defaults.sweep_interval_seconds,
            )?,
            shutdown_grace_seconds: parse_var(
                &lookup,
                "VERIFICATION_SHUTDOWN_GRACE_SECONDS",
                defaults.shutdown_grace_seconds,
            )?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check that every value is usable
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.code_length == 0 || self.code_length > MAX_CODE_LENGTH {
            return Err(ConfigError::Invalid {
                key: "code_length".to_string(),
                message: format!("must be between 1 and {}", MAX_CODE_LENGTH),
            });
        }
        for (key, value) in [
            ("ttl_seconds", self.ttl_seconds),
            ("sweep_interval_seconds", self.sweep_interval_seconds),
            ("shutdown_grace_seconds", self.shutdown_grace_seconds),
        ] {
            if value == 0 {
                return Err(ConfigError::Invalid {
                    key: key.to_string(),
                    message: "must be greater than zero".to_string(),
                });
            }
        }
        Ok(())
    }
}

fn default_code_length() -> usize {
    DEFAULT_CODE_LENGTH
}

fn default_ttl_seconds() -> u64 {
    300 // 5 minutes
}

fn default_sweep_interval_seconds() -> u64 {
    60 // 1 minute
}

fn default_shutdown_grace_seconds() -> u64 {
    5
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = VerificationCodeConfig::default();
        assert_eq!(config.code_length, 6);
        assert_eq!(config.ttl_seconds, 300);
        assert_eq!(config.sweep_interval_seconds, 60);
        assert_eq!(config.shutdown_grace_seconds, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_lookup_overrides() {
        let config = VerificationCodeConfig::from_lookup(lookup_from(&[
            ("VERIFICATION_CODE_LENGTH", "8"),
            ("VERIFICATION_CODE_TTL_SECONDS", " 600 "),
        ]))
        .unwrap();

        assert_eq!(config.code_length, 8);
        assert_eq!(config.ttl_seconds, 600);
        assert_eq!(config.sweep_interval_seconds, 60);
    }

    #[test]
    fn test_from_lookup_rejects_garbage() {
        let result = VerificationCodeConfig::from_lookup(lookup_from(&[(
            "VERIFICATION_SWEEP_INTERVAL_SECONDS",
            "soon",
        )]));

        match result {
            Err(ConfigError::Parse { key, .. }) => {
                assert_eq!(key, "VERIFICATION_SWEEP_INTERVAL_SECONDS")
            }
            other => panic!("Expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_rejects_zero_values() {
        let config = VerificationCodeConfig {
            code_length: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = VerificationCodeConfig {
            ttl_seconds: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = VerificationCodeConfig {
            code_length: MAX_CODE_LENGTH + 1,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_deserialize_fills_defaults() {
        let config: VerificationCodeConfig = serde_json::from_str(r#"{"ttl_seconds": 120}"#).unwrap();
        assert_eq!(config.ttl_seconds, 120);
        assert_eq!(config.code_length, DEFAULT_CODE_LENGTH);
    }
}
