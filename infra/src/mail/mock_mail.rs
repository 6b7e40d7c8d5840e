//! Mock Mail Transport Implementation
//!
//! Logs verification emails instead of sending them. Used in development and
//! tests, and as the fallback when no real provider is configured.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{info, warn};
use uuid::Uuid;

use hs_core::services::verification::MailTransport;
use hs_shared::utils::email::{is_valid_email, mask_email};

use crate::InfrastructureError;

/// A message accepted by the mock transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMail {
    pub message_id: String,
    pub subject: String,
    pub body: String,
}

/// Mock mail transport for development and testing
///
/// This implementation:
/// - Logs messages instead of delivering them
/// - Validates recipient addresses
/// - Generates mock message IDs
/// - Keeps the last message per recipient for inspection
#[derive(Clone)]
pub struct MockMailTransport {
    /// Counter for tracking number of messages sent
    message_count: Arc<AtomicU64>,
    /// Last message accepted for each recipient
    outbox: Arc<Mutex<HashMap<String, SentMail>>>,
    /// Whether to simulate failures (for testing)
    simulate_failure: bool,
    /// Whether to print messages to console
    console_output: bool,
}

impl MockMailTransport {
    /// Create a new mock mail transport
    pub fn new() -> Self {
        Self::with_options(true, false)
    }

    /// Create a mock transport with configurable options
    pub fn with_options(console_output: bool, simulate_failure: bool) -> Self {
        Self {
            message_count: Arc::new(AtomicU64::new(0)),
            outbox: Arc::new(Mutex::new(HashMap::new())),
            simulate_failure,
            console_output,
        }
    }

    /// Get the total number of messages sent
    pub fn get_message_count(&self) -> u64 {
        self.message_count.load(Ordering::SeqCst)
    }

    /// Reset the message counter
    pub fn reset_counter(&self) {
        self.message_count.store(0, Ordering::SeqCst);
    }

    /// Enable or disable failure simulation
    pub fn set_simulate_failure(&mut self, simulate: bool) {
        self.simulate_failure = simulate;
    }

    /// The most recent message accepted for `to`
    pub fn last_message_for(&self, to: &str) -> Option<SentMail> {
        self.outbox
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(to)
            .cloned()
    }

    /// Accept a message, returning its mock message id
    pub async fn send_mail(&self, to: &str, subject: &str, body: &str) -> Result<String, InfrastructureError> {
        if !is_valid_email(to) {
            return Err(InfrastructureError::Mail(format!(
                "Invalid email address format: {}",
                mask_email(to)
            )));
        }

        if self.simulate_failure {
            warn!(
                recipient = %mask_email(to),
                "Mock mail transport simulating failure"
            );
            return Err(InfrastructureError::Mail(
                "Simulated mail sending failure".to_string(),
            ));
        }

        let message_id = format!("mock_{}", Uuid::new_v4());
        let count = self.message_count.fetch_add(1, Ordering::SeqCst) + 1;
        let masked = mask_email(to);

        if self.console_output {
            println!("\n{}", "=".repeat(60));
            println!("MOCK MAIL TRANSPORT - MESSAGE #{}", count);
            println!("{}", "=".repeat(60));
            println!("To: {} (masked: {})", to, masked);
            println!("Subject: {}", subject);
            println!("Message ID: {}", message_id);
            println!("{}", body);
            println!("{}\n", "=".repeat(60));
        }

        info!(
            target: "mail_service",
            provider = "mock",
            recipient = %masked,
            message_id = %message_id,
            body_length = body.len(),
            "Mail sent successfully (mock)"
        );

        self.outbox
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(
                to.to_string(),
                SentMail {
                    message_id: message_id.clone(),
                    subject: subject.to_string(),
                    body: body.to_string(),
                },
            );

        Ok(message_id)
    }
}

impl Default for MockMailTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MailTransport for MockMailTransport {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<String, String> {
        self.send_mail(to, subject, body).await.map_err(|e| e.to_string())
    }
}
