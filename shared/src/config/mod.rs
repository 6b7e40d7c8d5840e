//! Configuration module with business-specific sub-modules
//!
//! This module organizes configuration into logical areas:
//! - `environment` - Environment detection and logging configuration
//! - `mail` - Outgoing mail transport configuration
//! - `verification` - Verification code lifetime and sweeping

pub mod environment;
pub mod mail;
pub mod verification;

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

// Re-export commonly used types
pub use environment::{Environment, LogFormat, LoggingConfig};
pub use mail::MailConfig;
pub use verification::VerificationCodeConfig;

/// Configuration loading errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing configuration value: {key}")]
    Missing { key: String },

    #[error("Invalid configuration value for {key}: {message}")]
    Invalid { key: String, message: String },

    #[error("Cannot parse {key}={value}")]
    Parse { key: String, value: String },
}

/// Read `key` through `lookup` and parse it, using `default` when it is absent or blank
pub(crate) fn parse_var<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw.trim().parse().map_err(|_| ConfigError::Parse {
            key: key.to_string(),
            value: raw,
        }),
        _ => Ok(default),
    }
}

/// Complete application configuration combining all sub-configurations
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Environment configuration
    pub environment: Environment,

    /// Verification code configuration
    #[serde(default)]
    pub verification: VerificationCodeConfig,

    /// Mail configuration
    #[serde(default)]
    pub mail: MailConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        let env = Environment::default();
        Self {
            environment: env,
            verification: VerificationCodeConfig::default(),
            mail: MailConfig::default(),
            logging: LoggingConfig::for_environment(env),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = Environment::from_lookup(&lookup)?;
        Ok(Self {
            environment,
            verification: VerificationCodeConfig::from_lookup(&lookup)?,
            mail: MailConfig::from_lookup(&lookup)?,
            logging: LoggingConfig::from_lookup(environment, &lookup)?,
        })
    }

    /// Validate every sub-configuration
    ///
    /// Production must deliver codes for real, so the mock mail provider is
    /// rejected there.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.verification.validate()?;
        self.mail.validate()?;
        if self.environment.is_production() && self.mail.is_mock() {
            return Err(ConfigError::Invalid {
                key: "MAIL_PROVIDER".to_string(),
                message: "the mock provider cannot be used in production".to_string(),
            });
        }
        Ok(())
    }
}
