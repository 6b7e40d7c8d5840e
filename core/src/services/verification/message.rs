//! Rendering of the verification email

use std::time::Duration;

/// Subject line of every verification email
pub const VERIFICATION_SUBJECT: &str = "[Health Management System] Email verification code";

/// A rendered email ready to hand to a [`MailTransport`](super::MailTransport)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub subject: String,
    /// HTML body
    pub body: String,
}

/// Render the verification email carrying `code`, valid for `ttl`
pub fn render_verification_email(code: &str, ttl: Duration) -> EmailMessage {
    let minutes = validity_minutes(ttl);
    let body = format!(
        "<html><body>\
         <h2>Health Management System - Email Verification</h2>\
         <p>Hello!</p>\
         <p>Your verification code is: \
         <strong style='color: #007cff; font-size: 18px;'>{code}</strong></p>\
         <p>The code is valid for {minutes} minute{plural}. Please use it promptly.</p>\
         <p>If you did not request this code, please ignore this email.</p>\
         <br>\
         <p>This email was sent automatically, please do not reply.</p>\
         <p>Health Management System Team</p>\
         </body></html>",
        code = code,
        minutes = minutes,
        plural = if minutes == 1 { "" } else { "s" },
    );

    EmailMessage {
        subject: VERIFICATION_SUBJECT.to_string(),
        body,
    }
}

// Rounded up so a 90 second TTL is not advertised as 1 minute.
fn validity_minutes(ttl: Duration) -> u64 {
    ttl.as_secs().div_ceil(60).max(1)
}
