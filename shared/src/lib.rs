//! Shared utilities and common types for HealthSys services
//!
//! This crate provides common functionality used across all modules:
//! - Configuration types loaded from the environment
//! - Utility functions (email validation and masking)

pub mod config;
pub mod utils;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, ConfigError, Environment, LogFormat, LoggingConfig, MailConfig,
    VerificationCodeConfig,
};
pub use utils::email;
