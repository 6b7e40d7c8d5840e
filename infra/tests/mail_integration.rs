//! Integration tests wiring infrastructure transports into the verification service

use std::sync::Arc;

use hs_core::services::verification::{
    VerificationService, VerificationServiceConfig, VerifyOutcome, VERIFICATION_SUBJECT,
};
use hs_infra::mail::{create_mail_transport, MockMailTransport};
use hs_infra::DomainError;
use hs_shared::config::{MailConfig, VerificationCodeConfig};

#[tokio::test]
async fn test_complete_mail_workflow() {
    let transport = Arc::new(MockMailTransport::with_options(false, false));
    let service = VerificationService::new(Arc::clone(&transport), VerificationServiceConfig::default());
    assert!(service.start());

    let sent = service.send_verification_code("patient@example.com").await.unwrap();

    let mail = transport.last_message_for("patient@example.com").unwrap();
    assert_eq!(mail.subject, VERIFICATION_SUBJECT);
    assert_eq!(mail.message_id, sent.message_id);
    assert!(mail.body.contains(&sent.code));
    assert!(mail.body.contains("valid for 5 minutes"));

    assert!(service.verify("patient@example.com", &sent.code));
    assert_eq!(
        service.verify_detailed("patient@example.com", &sent.code),
        VerifyOutcome::NotFound
    );

    service.shutdown().await;
}

#[tokio::test]
async fn test_transport_from_config() {
    let transport = create_mail_transport(&MailConfig::default()).unwrap();
    let service = VerificationService::new(Arc::new(transport), VerificationServiceConfig::default());
    service.start();

    let sent = service.send_verification_code("patient@example.com").await.unwrap();
    assert!(sent.message_id.starts_with("mock_"));
    assert!(service.verify("patient@example.com", &sent.code));

    service.shutdown().await;
}

#[tokio::test]
async fn test_transport_failure_surfaces_as_delivery_error() {
    let transport = Arc::new(MockMailTransport::with_options(false, true));
    let service = VerificationService::new(transport, VerificationServiceConfig::default());
    service.start();

    let result = service.send_verification_code("patient@example.com").await;
    match result {
        Err(DomainError::Delivery { message }) => {
            assert!(message.contains("Simulated mail sending failure"));
        }
        other => panic!("Expected delivery error, got {:?}", other.map(|r| r.message_id)),
    }
    assert_eq!(service.stored_codes(), 0);

    service.shutdown().await;
}

#[tokio::test]
async fn test_service_config_from_shared_config() {
    let shared = VerificationCodeConfig::from_lookup(|key| match key {
        "VERIFICATION_CODE_LENGTH" => Some("8".to_string()),
        "VERIFICATION_CODE_TTL_SECONDS" => Some("120".to_string()),
        _ => None,
    })
    .unwrap();
    let config = VerificationServiceConfig::from(&shared);

    let service = VerificationService::new(
        Arc::new(MockMailTransport::with_options(false, false)),
        config,
    );
    service.start();
    let sent = service.send_verification_code("patient@example.com").await.unwrap();
    assert_eq!(sent.code.len(), 8);
    assert_eq!((sent.expires_at - sent.issued_at).num_seconds(), 120);

    service.shutdown().await;
}

#[test]
fn test_unsupported_provider_fails_at_startup() {
    let config = MailConfig {
        provider: "smtp2go".to_string(),
        username: "sender@example.com".to_string(),
        password: "secret".to_string(),
        ..MailConfig::default()
    };

    assert!(create_mail_transport(&config).is_err());
}
