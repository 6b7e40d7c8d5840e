//! Verification service facade used by the registration workflow

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use hs_shared::utils::email::{is_valid_email, mask_email, normalize_email};

use crate::errors::{DomainError, DomainResult};

use super::clock::{Clock, SystemClock};
use super::config::VerificationServiceConfig;
use super::generator::generate_code;
use super::message::render_verification_email;
use super::store::CodeStore;
use super::sweeper::{SweepReport, Sweeper, SweeperStats};
use super::traits::MailTransport;
use super::types::{SendCodeResult, VerifyOutcome};
use super::verifier::Verifier;

/// Verification service for handling email verification codes
///
/// Create one instance at startup and hand it to whatever needs it. Building
/// the service does not spawn anything; call [`start`](Self::start) from inside
/// a Tokio runtime to run the background sweeper, and
/// [`shutdown`](Self::shutdown) before dropping it to stop the sweeper within
/// its grace period and wipe stored codes.
pub struct VerificationService<M: MailTransport> {
    /// Transport used to deliver codes
    mail: Arc<M>,
    /// Service configuration
    config: VerificationServiceConfig,
    /// Issue/verify/clear state machine
    verifier: Verifier,
    /// Background evictor
    sweeper: Sweeper,
    shut_down: AtomicBool,
}

impl<M: MailTransport> VerificationService<M> {
    /// Create a new verification service using the system clock
    ///
    /// # Arguments
    ///
    /// * `mail` - Mail transport implementation
    /// * `config` - Service configuration
    pub fn new(mail: Arc<M>, config: VerificationServiceConfig) -> Self {
        Self::with_clock(mail, config, Arc::new(SystemClock))
    }

    /// Create a new verification service reading time from `clock`
    pub fn with_clock(mail: Arc<M>, config: VerificationServiceConfig, clock: Arc<dyn Clock>) -> Self {
        let store = Arc::new(CodeStore::new());
        let verifier = Verifier::new(Arc::clone(&store), Arc::clone(&clock), config.code_length, config.ttl);
        let sweeper = Sweeper::new(
            store,
            clock,
            config.ttl,
            config.sweep_interval,
            config.shutdown_grace,
        );
        Self {
            mail,
            config,
            verifier,
            sweeper,
            shut_down: AtomicBool::new(false),
        }
    }

    /// Start the background sweeper on the current Tokio runtime
    ///
    /// Returns `false` if the sweeper is already running or the service has
    /// been shut down.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn start(&self) -> bool {
        if self.is_shut_down() {
            tracing::warn!("Verification service already shut down, not starting sweeper");
            return false;
        }
        if !self.sweeper.start() {
            return false;
        }

        tracing::info!(
            code_length = self.config.code_length,
            ttl_secs = self.config.ttl.as_secs(),
            sweep_interval_secs = self.config.sweep_interval.as_secs(),
            "Verification service started"
        );
        true
    }

    /// Send a verification code to an email address
    ///
    /// This method:
    /// 1. Validates the email address format
    /// 2. Generates a new verification code
    /// 3. Delivers it through the mail transport
    /// 4. Stores the code, replacing any earlier one, only once delivery succeeded
    ///
    /// A code that could not be delivered never becomes verifiable, and any
    /// previously stored code stays valid.
    ///
    /// # Returns
    ///
    /// * `Ok(SendCodeResult)` - The delivered code and its validity window
    /// * `Err(DomainError)` - If the address is invalid or delivery fails
    pub async fn send_verification_code(&self, identity: &str) -> DomainResult<SendCodeResult> {
        let identity = normalize_email(identity);
        if !is_valid_email(&identity) {
            tracing::warn!(
                identity = %mask_email(&identity),
                event = "invalid_email",
                "Rejected verification request for malformed email address"
            );
            return Err(DomainError::Validation {
                message: format!("Invalid email address: {}", mask_email(&identity)),
            });
        }

        let code = generate_code(self.config.code_length);
        let message = render_verification_email(&code, self.config.ttl);

        let message_id = self
            .mail
            .send(&identity, &message.subject, &message.body)
            .await
            .map_err(|e| {
                tracing::error!(
                    identity = %mask_email(&identity),
                    error = %e,
                    event = "otp_delivery_failed",
                    "Failed to deliver verification code"
                );
                DomainError::Delivery {
                    message: format!("Failed to send verification email: {}", e),
                }
            })?;

        let entry = self.verifier.store_code(&identity, &code);

        tracing::info!(
            identity = %mask_email(&identity),
            message_id = %message_id,
            event = "otp_sent",
            "Verification code delivered"
        );

        Ok(SendCodeResult {
            expires_at: entry.expires_at(self.config.ttl),
            issued_at: entry.issued_at,
            identity,
            code,
            message_id,
        })
    }

    /// Issue a code for `identity` without sending it
    ///
    /// The caller must only treat the code as delivered once its own send
    /// succeeded; prefer [`send_verification_code`](Self::send_verification_code),
    /// which enforces that ordering.
    pub fn issue(&self, identity: &str) -> String {
        self.verifier.issue(&normalize_email(identity))
    }

    /// Check a presented code; `true` exactly once per issued code
    pub fn verify(&self, identity: &str, code: &str) -> bool {
        self.verify_detailed(identity, code).is_success()
    }

    /// Check a presented code and report why it was rejected
    pub fn verify_detailed(&self, identity: &str, code: &str) -> VerifyOutcome {
        self.verifier.verify(&normalize_email(identity), code.trim())
    }

    /// Remove any code stored for `identity`
    pub fn clear(&self, identity: &str) {
        self.verifier.clear(&normalize_email(identity));
    }

    /// Check if an unexpired code exists for `identity`
    pub fn code_exists(&self, identity: &str) -> bool {
        self.verifier.has_active_code(&normalize_email(identity))
    }

    /// Number of codes currently held, expired or not
    pub fn stored_codes(&self) -> usize {
        self.verifier.store().len()
    }

    /// Evict expired codes now instead of waiting for the next tick
    pub fn sweep_now(&self) -> SweepReport {
        self.sweeper.sweep_once()
    }

    pub fn sweeper_stats(&self) -> SweeperStats {
        self.sweeper.stats()
    }

    pub fn is_sweeper_running(&self) -> bool {
        self.sweeper.is_running()
    }

    pub fn config(&self) -> &VerificationServiceConfig {
        &self.config
    }

    /// Stop the sweeper and wipe every stored code
    ///
    /// Safe to call more than once; only the first call does any work.
    pub async fn shutdown(&self) {
        if self.shut_down.swap(true, Ordering::SeqCst) {
            return;
        }

        self.sweeper.stop().await;
        self.verifier.store().clear();

        tracing::info!("Verification service shut down");
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down.load(Ordering::SeqCst)
    }
}
