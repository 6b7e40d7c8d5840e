//! Verification code entity for email-based registration.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Length of the verification code
pub const CODE_LENGTH: usize = 6;

/// Default expiration time for verification codes (5 minutes)
pub const DEFAULT_EXPIRATION_MINUTES: i64 = 5;

/// A code issued to an identity, as held by the code store
///
/// Entries are never mutated after creation. Whether an entry is expired is
/// derived from its age at the time of inspection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeEntry {
    /// Email address the code was issued to
    pub identity: String,

    /// The numeric verification code
    pub code: String,

    /// Timestamp when the code was issued
    pub issued_at: DateTime<Utc>,
}

impl CodeEntry {
    /// Creates an entry issued at `issued_at`
    pub fn new(identity: impl Into<String>, code: impl Into<String>, issued_at: DateTime<Utc>) -> Self {
        Self {
            identity: identity.into(),
            code: code.into(),
            issued_at,
        }
    }

    /// Age of the entry at `now`; negative when `issued_at` lies in the future
    pub fn age(&self, now: DateTime<Utc>) -> ChronoDuration {
        now - self.issued_at
    }

    /// Whether the entry is issued in the future relative to `now`
    pub fn is_from_future(&self, now: DateTime<Utc>) -> bool {
        self.issued_at > now
    }

    /// Checks if the entry is older than `ttl` at `now`
    ///
    /// An entry exactly `ttl` old is still valid. Entries stamped in the future
    /// are never expired.
    pub fn is_expired(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        match self.age(now).to_std() {
            Ok(age) => age > ttl,
            Err(_) => false,
        }
    }

    /// Time at which the entry stops being valid
    pub fn expires_at(&self, ttl: Duration) -> DateTime<Utc> {
        let ttl = ChronoDuration::from_std(ttl).unwrap_or(ChronoDuration::MAX);
        self.issued_at.checked_add_signed(ttl).unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    /// Gets the time remaining until expiration, or zero if expired
    pub fn time_until_expiration(&self, now: DateTime<Utc>, ttl: Duration) -> Duration {
        (self.expires_at(ttl) - now).to_std().unwrap_or(Duration::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issued_at() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-03-01T08:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn ttl() -> Duration {
        Duration::from_secs(DEFAULT_EXPIRATION_MINUTES as u64 * 60)
    }

    #[test]
    fn test_new_entry() {
        let entry = CodeEntry::new("a@x.com", "482913", issued_at());

        assert_eq!(entry.identity, "a@x.com");
        assert_eq!(entry.code, "482913");
        assert_eq!(entry.issued_at, issued_at());
    }

    #[test]
    fn test_expiry_boundary() {
        let entry = CodeEntry::new("a@x.com", "482913", issued_at());

        let at_ttl = issued_at() + ChronoDuration::minutes(DEFAULT_EXPIRATION_MINUTES);
        assert!(!entry.is_expired(at_ttl, ttl()));

        let past_ttl = at_ttl + ChronoDuration::milliseconds(1);
        assert!(entry.is_expired(past_ttl, ttl()));
    }

    #[test]
    fn test_future_entry_is_not_expired() {
        let entry = CodeEntry::new("a@x.com", "482913", issued_at());
        let before = issued_at() - ChronoDuration::hours(1);

        assert!(entry.is_from_future(before));
        assert!(!entry.is_expired(before, ttl()));
        assert!(entry.age(before) < ChronoDuration::zero());
    }

    #[test]
    fn test_time_until_expiration() {
        let entry = CodeEntry::new("a@x.com", "482913", issued_at());

        let one_minute_in = issued_at() + ChronoDuration::minutes(1);
        assert_eq!(
            entry.time_until_expiration(one_minute_in, ttl()),
            Duration::from_secs(4 * 60)
        );

        let long_after = issued_at() + ChronoDuration::hours(1);
        assert_eq!(entry.time_until_expiration(long_after, ttl()), Duration::ZERO);
        assert_eq!(entry.expires_at(ttl()), issued_at() + ChronoDuration::minutes(5));
    }

    #[test]
    fn test_serialization() {
        let entry = CodeEntry::new("a@x.com", "482913", issued_at());

        let json = serde_json::to_string(&entry).unwrap();
        let deserialized: CodeEntry = serde_json::from_str(&json).unwrap();

        assert_eq!(entry, deserialized);
    }
}
