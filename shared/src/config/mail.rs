//! Mail delivery configuration module

use serde::{Deserialize, Serialize};

use super::{parse_var, ConfigError};
use crate::utils::email::is_valid_email;

/// Provider name of the built-in console transport
pub const MOCK_PROVIDER: &str = "mock";

/// Provider name of the SMTP relay transport
pub const SMTP_PROVIDER: &str = "smtp";

/// Outgoing mail configuration
#[derive(Clone, Deserialize, Serialize)]
pub struct MailConfig {
    /// Transport provider ("mock", "smtp")
    #[serde(default = "default_provider")]
    pub provider: String,

    /// SMTP host
    #[serde(default = "default_host")]
    pub host: String,

    /// SMTP port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Account used to authenticate and as the sender address
    #[serde(default)]
    pub username: String,

    /// Account password or authorization code
    #[serde(default)]
    pub password: String,

    /// Display name shown as the sender
    #[serde(default = "default_from_name")]
    pub from_name: String,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            host: default_host(),
            port: default_port(),
            username: String::new(),
            password: String::new(),
            from_name: default_from_name(),
        }
    }
}

// Keeps the password out of debug output.
impl std::fmt::Debug for MailConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MailConfig")
            .field("provider", &self.provider)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &if self.password.is_empty() { "<unset>" } else { "<set>" })
            .field("from_name", &self.from_name)
            .finish()
    }
}

impl MailConfig {
    /// Create from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create from an arbitrary key lookup
    ///
    /// Credentials are read from `MAIL_USERNAME`/`MAIL_PASSWORD`, falling back to
    /// the legacy `SPRING_MAIL_USERNAME`/`SPRING_MAIL_PASSWORD` names.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let text = |keys: &[&str], default: &str| {
            keys.iter()
                .find_map(|&key| lookup(key))
                .map(|value| value.trim().to_string())
                .unwrap_or_else(|| default.to_string())
        };

        Ok(Self {
            provider: text(&["MAIL_PROVIDER"], &defaults.provider).to_lowercase(),
            host: text(&["MAIL_HOST"], &defaults.host),
            port: parse_var(&lookup, "MAIL_PORT", defaults.port)?,
            username: text(&["MAIL_USERNAME", "SPRING_MAIL_USERNAME"], ""),
            password: text(&["MAIL_PASSWORD", "SPRING_MAIL_PASSWORD"], ""),
            from_name: text(&["MAIL_FROM_NAME"], &defaults.from_name),
        })
    }

    /// Whether the console transport is selected
    pub fn is_mock(&self) -> bool {
        self.provider == MOCK_PROVIDER
    }

    /// Whether the SMTP relay transport is selected
    pub fn is_smtp(&self) -> bool {
        self.provider == SMTP_PROVIDER
    }

    /// Check that the provider is known and, if real, has usable credentials
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.is_mock() {
            return Ok(());
        }
        if !self.is_smtp() {
            return Err(ConfigError::Invalid {
                key: "MAIL_PROVIDER".to_string(),
                message: format!(
                    "unsupported provider '{}', expected '{}' or '{}'",
                    self.provider, MOCK_PROVIDER, SMTP_PROVIDER
                ),
            });
        }
        if self.host.trim().is_empty() {
            return Err(ConfigError::Missing {
                key: "MAIL_HOST".to_string(),
            });
        }
        if self.username.trim().is_empty() {
            return Err(ConfigError::Missing {
                key: "MAIL_USERNAME".to_string(),
            });
        }
        if self.password.trim().is_empty() {
            return Err(ConfigError::Missing {
                key: "MAIL_PASSWORD".to_string(),
            });
        }
        if !is_valid_email(&self.username) {
            return Err(ConfigError::Invalid {
                key: "MAIL_USERNAME".to_string(),
                message: "sender must be a valid email address".to_string(),
            });
        }
        Ok(())
    }
}

fn default_provider() -> String {
    String::from(MOCK_PROVIDER)
}

fn default_host() -> String {
    String::from("smtp.qq.com")
}

fn default_port() -> u16 {
    587
}

fn default_from_name() -> String {
    String::from("Health Management System")
}
