//! Verification service module for email-based registration
//!
//! This module provides the verification code workflow:
//! - Numeric code generation
//! - A concurrent in-memory code store, one code per email address
//! - One-time verification under a TTL policy
//! - A background sweeper evicting expired codes
//! - Delivery through a pluggable mail transport

mod clock;
mod config;
mod generator;
mod message;
mod service;
mod store;
mod sweeper;
mod traits;
mod types;
mod verifier;

#[cfg(test)]
mod tests;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::VerificationServiceConfig;
pub use generator::generate_code;
pub use message::{render_verification_email, EmailMessage, VERIFICATION_SUBJECT};
pub use service::VerificationService;
pub use store::CodeStore;
pub use sweeper::{SweepReport, Sweeper, SweeperStats};
pub use traits::MailTransport;
pub use types::{SendCodeResult, VerifyOutcome};
pub use verifier::Verifier;
