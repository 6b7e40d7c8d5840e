//! Deployment environment and log output settings

use serde::{Deserialize, Serialize};

use super::{parse_var, ConfigError};

/// Deployment stage the process runs in
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    /// Read the stage from `APP_ENV`, then `ENVIRONMENT`; development when unset
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let key = ["APP_ENV", "ENVIRONMENT"]
            .into_iter()
            .find(|&key| lookup(key).is_some_and(|value| !value.trim().is_empty()))
            .unwrap_or("APP_ENV");
        parse_var(&lookup, key, Environment::Development)
    }

    pub fn is_production(&self) -> bool {
        *self == Environment::Production
    }

    /// Dotenv file holding settings for this stage, loaded before `.env`
    pub fn env_file(&self) -> &'static str {
        match self {
            Environment::Development => ".env.development",
            Environment::Staging => ".env.staging",
            Environment::Production => ".env.production",
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Staging => "staging",
            Environment::Production => "production",
        }
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dev" | "development" => Ok(Environment::Development),
            "staging" | "test" => Ok(Environment::Staging),
            "prod" | "production" => Ok(Environment::Production),
            other => Err(format!("unknown environment '{}'", other)),
        }
    }
}

/// How log lines are rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Multi-line, human oriented
    Pretty,
    /// One line per event
    Compact,
    /// One JSON object per event, for log shippers
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "compact" => Ok(LogFormat::Compact),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format '{}'", other)),
        }
    }
}

/// Settings for the log subscriber
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Default filter directive, e.g. `info` or `hs_core=debug,info`
    pub level: String,

    #[serde(default = "default_format")]
    pub format: LogFormat,

    /// ANSI colours in terminal output
    #[serde(default)]
    pub colored: bool,

    /// Print file and line of each event
    #[serde(default)]
    pub source_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self::for_environment(Environment::default())
    }
}

impl LoggingConfig {
    /// Baseline for a stage: verbose and readable locally, JSON once deployed
    pub fn for_environment(env: Environment) -> Self {
        let deployed = env != Environment::Development;
        let level = match env {
            Environment::Development => "debug",
            Environment::Staging => "info",
            Environment::Production => "warn",
        };
        Self {
            level: level.to_string(),
            format: if deployed { LogFormat::Json } else { default_format() },
            colored: !deployed,
            source_location: !deployed,
        }
    }

    /// Baseline for `env`, with `LOG_LEVEL` and `LOG_FORMAT` applied on top
    pub fn from_lookup<F>(env: Environment, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base = Self::for_environment(env);
        Ok(Self {
            level: lookup("LOG_LEVEL")
                .map(|level| level.trim().to_string())
                .filter(|level| !level.is_empty())
                .unwrap_or(base.level),
            format: parse_var(&lookup, "LOG_FORMAT", base.format)?,
            ..base
        })
    }
}

fn default_format() -> LogFormat {
    LogFormat::Pretty
}
