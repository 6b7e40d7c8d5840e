//! SMTP Mail Transport Implementation
//!
//! Delivers verification emails through an authenticated SMTP relay using
//! STARTTLS, configured from `MailConfig`.

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::time::Duration;
use tracing::{error, info};
use uuid::Uuid;

use hs_core::services::verification::MailTransport;
use hs_shared::config::MailConfig;
use hs_shared::utils::email::mask_email;

use crate::InfrastructureError;

/// How long a single SMTP exchange may take before delivery is reported failed
const SMTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Mail transport backed by an SMTP relay
///
/// Each message opens its own connection; nothing is opened until the first
/// message is sent.
pub struct SmtpMailTransport {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    host: String,
}

impl SmtpMailTransport {
    /// Build a transport from validated mail settings
    ///
    /// The sender address is the account username; `from_name` is shown as
    /// its display name.
    pub fn from_config(config: &MailConfig) -> Result<Self, InfrastructureError> {
        config.validate()?;

        let address: Address = config
            .username
            .parse()
            .map_err(|e| InfrastructureError::Mail(format!("Invalid sender address: {}", e)))?;
        let from = Mailbox::new(Some(config.from_name.clone()), address);

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .map_err(|e| {
                InfrastructureError::Mail(format!("Cannot configure SMTP relay {}: {}", config.host, e))
            })?
            .port(config.port)
            .credentials(Credentials::new(config.username.clone(), config.password.clone()))
            .timeout(Some(SMTP_TIMEOUT))
            .build();

        info!(
            host = %config.host,
            port = config.port,
            sender = %mask_email(&config.username),
            "SMTP mail transport configured"
        );

        Ok(Self {
            mailer,
            from,
            host: config.host.clone(),
        })
    }

    /// Deliver an HTML message, returning the Message-ID it was sent with
    pub async fn send_mail(&self, to: &str, subject: &str, body: &str) -> Result<String, InfrastructureError> {
        let masked = mask_email(to);
        let recipient: Mailbox = to
            .parse()
            .map_err(|_| InfrastructureError::Mail(format!("Invalid email address format: {}", masked)))?;

        let message_id = format!("<{}@{}>", Uuid::new_v4(), self.host);
        let message = Message::builder()
            .from(self.from.clone())
            .to(recipient)
            .subject(subject)
            .message_id(Some(message_id.clone()))
            .header(ContentType::TEXT_HTML)
            .body(body.to_string())
            .map_err(|e| InfrastructureError::Mail(format!("Cannot build message: {}", e)))?;

        let response = self.mailer.send(message).await.map_err(|e| {
            error!(
                target: "mail_service",
                provider = "smtp",
                recipient = %masked,
                error = %e,
                "SMTP delivery failed"
            );
            InfrastructureError::Mail(format!("SMTP delivery failed: {}", e))
        })?;

        if !response.is_positive() {
            return Err(InfrastructureError::Mail(format!(
                "SMTP relay rejected message with code {}",
                response.code()
            )));
        }

        info!(
            target: "mail_service",
            provider = "smtp",
            recipient = %masked,
            message_id = %message_id,
            "Mail sent successfully"
        );

        Ok(message_id)
    }
}

#[async_trait]
impl MailTransport for SmtpMailTransport {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<String, String> {
        self.send_mail(to, subject, body).await.map_err(|e| e.to_string())
    }
}
