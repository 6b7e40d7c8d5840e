//! Issue / verify / clear operations applying the TTL policy

use constant_time_eq::constant_time_eq;
use std::sync::Arc;
use std::time::Duration;

use hs_shared::utils::email::mask_email;

use crate::domain::entities::verification_code::CodeEntry;

use super::clock::Clock;
use super::generator::generate_code;
use super::store::CodeStore;
use super::types::VerifyOutcome;

/// Per-identity state machine over the code store
///
/// An identity is either absent or holds one active entry; expiry is judged
/// at read time. Verification inspects and evicts in a single store
/// operation, so a code issued concurrently is never removed by a check
/// against its predecessor.
#[derive(Clone)]
pub struct Verifier {
    store: Arc<CodeStore>,
    clock: Arc<dyn Clock>,
    code_length: usize,
    ttl: Duration,
}

impl Verifier {
    pub fn new(store: Arc<CodeStore>, clock: Arc<dyn Clock>, code_length: usize, ttl: Duration) -> Self {
        Self {
            store,
            clock,
            code_length,
            ttl,
        }
    }

    /// Generate a code for `identity` and store it, replacing any previous code
    pub fn issue(&self, identity: &str) -> String {
        let code = generate_code(self.code_length);
        self.store_code(identity, &code);
        code
    }

    /// Store an already generated code for `identity`, stamped with the current time
    pub fn store_code(&self, identity: &str, code: &str) -> CodeEntry {
        let entry = CodeEntry::new(identity, code, self.clock.now());
        let replaced = self.store.put(entry.clone());

        tracing::info!(
            identity = %mask_email(identity),
            replaced_previous = replaced.is_some(),
            event = "otp_issued",
            "Stored verification code"
        );
        entry
    }

    /// Check `presented` against the code stored for `identity`
    ///
    /// Blank input never matches and leaves the store untouched.
    pub fn verify(&self, identity: &str, presented: &str) -> VerifyOutcome {
        if identity.trim().is_empty() || presented.trim().is_empty() {
            tracing::debug!(event = "otp_blank_input", "Blank identity or code presented");
            return VerifyOutcome::NotFound;
        }

        let now = self.clock.now();
        let ttl = self.ttl;
        let outcome = self
            .store
            .inspect_and_remove(identity, |entry| {
                let outcome = if entry.is_expired(now, ttl) {
                    VerifyOutcome::Expired
                } else if constant_time_eq(entry.code.as_bytes(), presented.as_bytes()) {
                    VerifyOutcome::Success
                } else {
                    VerifyOutcome::Mismatch
                };
                (outcome, outcome.evicts())
            })
            .unwrap_or(VerifyOutcome::NotFound);

        let masked = mask_email(identity);
        match outcome {
            VerifyOutcome::Success => tracing::info!(
                identity = %masked,
                event = "otp_verified",
                "Verification code accepted"
            ),
            VerifyOutcome::NotFound => tracing::info!(
                identity = %masked,
                event = "otp_not_found",
                "No verification code stored for identity"
            ),
            VerifyOutcome::Expired => tracing::info!(
                identity = %masked,
                event = "otp_expired",
                "Verification code expired and was evicted"
            ),
            VerifyOutcome::Mismatch => tracing::info!(
                identity = %masked,
                event = "otp_mismatch",
                "Verification code did not match"
            ),
        }

        outcome
    }

    /// Remove any code stored for `identity`; a no-op when none exists
    pub fn clear(&self, identity: &str) {
        if self.store.remove(identity).is_some() {
            tracing::debug!(
                identity = %mask_email(identity),
                event = "otp_cleared",
                "Cleared verification code"
            );
        }
    }

    /// Whether a live (unexpired) code is stored for `identity`
    pub fn has_active_code(&self, identity: &str) -> bool {
        self.store
            .get(identity)
            .map(|entry| !entry.is_expired(self.clock.now(), self.ttl))
            .unwrap_or(false)
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn store(&self) -> &Arc<CodeStore> {
        &self.store
    }
}
