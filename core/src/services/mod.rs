//! Business services containing domain logic and use cases.

pub mod verification;

// Re-export commonly used types
pub use verification::{
    Clock, CodeStore, MailTransport, SendCodeResult, SweepReport, SystemClock,
    VerificationService, VerificationServiceConfig, VerifyOutcome,
};
