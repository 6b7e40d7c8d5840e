//! Tests for the SMTP transport that need no reachable relay

use std::sync::Arc;

use hs_core::services::verification::{VerificationService, VerificationServiceConfig};
use hs_shared::config::MailConfig;

use crate::mail::{create_mail_transport, SmtpMailTransport};
use crate::{DomainError, InfrastructureError};

fn smtp_config(host: &str, port: u16) -> MailConfig {
    MailConfig {
        provider: "smtp".to_string(),
        host: host.to_string(),
        port,
        username: "sender@example.com".to_string(),
        password: "secret".to_string(),
        ..MailConfig::default()
    }
}

#[tokio::test]
async fn test_smtp_transport_from_config() {
    let config = smtp_config("smtp.example.com", 587);
    assert!(SmtpMailTransport::from_config(&config).is_ok());
    assert!(create_mail_transport(&config).is_ok());
}

#[test]
fn test_smtp_transport_rejects_invalid_config() {
    let mut config = smtp_config("smtp.example.com", 587);
    config.password = String::new();

    assert!(matches!(
        SmtpMailTransport::from_config(&config),
        Err(InfrastructureError::Config(_))
    ));
}

#[tokio::test]
async fn test_smtp_invalid_recipient() {
    let transport = SmtpMailTransport::from_config(&smtp_config("smtp.example.com", 587)).unwrap();
    let result = transport.send_mail("not-an-address", "Subject", "Body").await;

    match result {
        Err(InfrastructureError::Mail(msg)) => assert!(msg.contains("Invalid email address")),
        other => panic!("Expected Mail error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_unreachable_relay_never_makes_code_verifiable() {
    // Nothing listens on port 1 of the loopback interface
    let transport = create_mail_transport(&smtp_config("127.0.0.1", 1)).unwrap();
    let service = VerificationService::new(Arc::new(transport), VerificationServiceConfig::default());

    let result = service.send_verification_code("patient@example.com").await;

    assert!(matches!(result, Err(DomainError::Delivery { .. })));
    assert!(!service.code_exists("patient@example.com"));
    assert_eq!(service.stored_codes(), 0);
}
