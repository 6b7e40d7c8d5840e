//! # Infrastructure Layer
//!
//! Concrete implementations the verification service runs against:
//! - **Mail**: transports that deliver verification codes
//! - **Telemetry**: `tracing` subscriber setup
//! - **Configuration**: `.env` loading and validation

// Re-export core types for convenience
pub use hs_core::errors::*;

use std::path::{Path, PathBuf};

use hs_shared::config::{AppConfig, ConfigError, Environment};

/// Mail transport module - outgoing verification emails
pub mod mail;

/// Telemetry module - log subscriber setup
pub mod telemetry;

/// Load and validate application configuration
///
/// The stage is read from the process environment (`APP_ENV` or
/// `ENVIRONMENT`). Its dotenv file, e.g. `.env.production`, is loaded first and
/// `.env` after it; variables that are already set are never overwritten.
pub fn load_config() -> Result<AppConfig, InfrastructureError> {
    let environment = Environment::from_lookup(|key| std::env::var(key).ok())?;
    let loaded = load_env_files(Path::new("."), environment);

    let config = AppConfig::from_env()?;
    config.validate()?;

    tracing::debug!(
        environment = %config.environment,
        mail_provider = %config.mail.provider,
        env_files = ?loaded,
        "Configuration loaded"
    );

    Ok(config)
}

/// Load the stage's dotenv file and then `.env` from `dir`, returning the files found
fn load_env_files(dir: &Path, environment: Environment) -> Vec<PathBuf> {
    [environment.env_file(), ".env"]
        .into_iter()
        .map(|name| dir.join(name))
        .filter(|path| dotenvy::from_path(path).is_ok())
        .collect()
}

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Mail transport error
    #[error("Mail service error: {0}")]
    Mail(String),

    /// General infrastructure error
    #[error("Infrastructure error: {0}")]
    General(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_conversion() {
        let err: InfrastructureError = ConfigError::Missing {
            key: "MAIL_PASSWORD".to_string(),
        }
        .into();

        assert!(matches!(err, InfrastructureError::Config(_)));
        assert!(err.to_string().starts_with("Configuration error:"));
        assert!(err.to_string().contains("MAIL_PASSWORD"));
    }

    #[test]
    fn test_stage_file_takes_precedence_over_dotenv() {
        let dir = std::env::temp_dir().join(format!("hs_infra_env_{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join(".env.staging"),
            "HS_INFRA_TEST_SHARED=from_stage\nHS_INFRA_TEST_STAGE_ONLY=stage\n",
        )
        .unwrap();
        std::fs::write(
            dir.join(".env"),
            "HS_INFRA_TEST_SHARED=from_base\nHS_INFRA_TEST_BASE_ONLY=base\n",
        )
        .unwrap();

        let loaded = load_env_files(&dir, Environment::Staging);

        assert_eq!(loaded, vec![dir.join(".env.staging"), dir.join(".env")]);
        assert_eq!(std::env::var("HS_INFRA_TEST_SHARED").unwrap(), "from_stage");
        assert_eq!(std::env::var("HS_INFRA_TEST_STAGE_ONLY").unwrap(), "stage");
        assert_eq!(std::env::var("HS_INFRA_TEST_BASE_ONLY").unwrap(), "base");

        // A stage without its own file only picks up .env
        assert_eq!(load_env_files(&dir, Environment::Production), vec![dir.join(".env")]);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_mail_error_display() {
        let err = InfrastructureError::Mail("relay refused".to_string());
        assert_eq!(err.to_string(), "Mail service error: relay refused");
    }
}
