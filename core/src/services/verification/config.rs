//! Configuration for the verification service

use std::time::Duration;

use hs_shared::config::VerificationCodeConfig;

use crate::domain::entities::verification_code::{CODE_LENGTH, DEFAULT_EXPIRATION_MINUTES};

/// Configuration for the verification service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationServiceConfig {
    /// Number of digits in an issued code
    pub code_length: usize,
    /// How long a code stays valid after issuance
    pub ttl: Duration,
    /// How often the sweeper evicts expired codes
    pub sweep_interval: Duration,
    /// How long shutdown waits for a running sweep before aborting it
    pub shutdown_grace: Duration,
}

impl Default for VerificationServiceConfig {
    fn default() -> Self {
        Self {
            code_length: CODE_LENGTH,
            ttl: Duration::from_secs(DEFAULT_EXPIRATION_MINUTES as u64 * 60),
            sweep_interval: Duration::from_secs(60),
            shutdown_grace: Duration::from_secs(5),
        }
    }
}

impl From<&VerificationCodeConfig> for VerificationServiceConfig {
    fn from(config: &VerificationCodeConfig) -> Self {
        Self {
            code_length: config.code_length,
            ttl: Duration::from_secs(config.ttl_seconds),
            sweep_interval: Duration::from_secs(config.sweep_interval_seconds),
            shutdown_grace: Duration::from_secs(config.shutdown_grace_seconds),
        }
    }
}
