//! Types for verification service results

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Outcome of checking a presented code against the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VerifyOutcome {
    /// The code matched and has been consumed
    Success,
    /// No code is stored for the identity
    NotFound,
    /// A code was stored but outlived its TTL; it has been evicted
    Expired,
    /// A live code is stored but differs from the presented one; it is kept
    Mismatch,
}

impl VerifyOutcome {
    /// Whether the presented code was accepted
    pub fn is_success(&self) -> bool {
        matches!(self, VerifyOutcome::Success)
    }

    /// Whether the stored entry was removed as part of this outcome
    pub fn evicts(&self) -> bool {
        matches!(self, VerifyOutcome::Success | VerifyOutcome::Expired)
    }

    /// Stable label used in logs
    pub fn as_str(&self) -> &'static str {
        match self {
            VerifyOutcome::Success => "success",
            VerifyOutcome::NotFound => "not_found",
            VerifyOutcome::Expired => "expired",
            VerifyOutcome::Mismatch => "mismatch",
        }
    }
}

impl std::fmt::Display for VerifyOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<VerifyOutcome> for bool {
    fn from(outcome: VerifyOutcome) -> Self {
        outcome.is_success()
    }
}

/// Result of sending a verification code
#[derive(Debug, Clone)]
pub struct SendCodeResult {
    /// Email address the code was delivered to
    pub identity: String,
    /// The code that is now verifiable
    pub code: String,
    /// When the code was stored
    pub issued_at: DateTime<Utc>,
    /// When the code stops being accepted
    pub expires_at: DateTime<Utc>,
    /// Message identifier reported by the mail transport
    pub message_id: String,
}
