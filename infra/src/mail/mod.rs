//! Mail Transport Module
//!
//! Transports that deliver verification emails on behalf of the core
//! verification service.
//!
//! ## Features
//!
//! - **SMTP Implementation**: Authenticated STARTTLS relay via `lettre`
//! - **Mock Implementation**: Console and log output for development
//! - **Provider Selection**: Transport chosen from `MailConfig::provider`
//! - **Security**: Recipient addresses are masked in logs

pub mod mock_mail;
pub mod smtp_mail;

pub use mock_mail::MockMailTransport;
pub use smtp_mail::SmtpMailTransport;

use hs_core::services::verification::MailTransport;
use hs_shared::config::MailConfig;

use crate::InfrastructureError;

#[cfg(test)]
mod tests;

/// Create a mail transport based on configuration
///
/// Returns the transport implementation for the provider named in the
/// configuration. Unknown providers and incomplete SMTP settings are
/// rejected; there is no silent fallback to the mock transport.
///
/// # Arguments
///
/// * `config` - Mail configuration containing provider settings
pub fn create_mail_transport(config: &MailConfig) -> Result<Box<dyn MailTransport>, InfrastructureError> {
    config.validate()?;

    if config.is_mock() {
        tracing::info!("Using mock mail transport, codes are not delivered");
        return Ok(Box::new(MockMailTransport::new()));
    }

    // validate() admits only mock and smtp
    Ok(Box::new(SmtpMailTransport::from_config(config)?))
}
