//! Token Expiry
//!
//! Expiry classification shared by every record that carries an expiry
//! timestamp and, optionally, a refresh token.

use chrono::{DateTime, Utc};

/// Capability of records with an expiry timestamp.
pub trait HasExpiry {
    /// Expiration time; `None` means the record never expires.
    fn expires_at(&self) -> Option<DateTime<Utc>>;

    /// Refresh token; `None` means the record cannot be refreshed.
    fn refresh_token(&self) -> Option<&str>;
}

/// Expiry state of a record at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExpiryStatus {
    /// No expiry set, or expiry in the future.
    Active,
    /// Expired, but a refresh token is present.
    ExpiredRefreshable,
    /// Expired with no refresh token.
    ExpiredDead,
}

impl ExpiryStatus {
    /// Whether the record may still be used.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }

    /// Whether the record is expired, refreshable or not.
    pub fn is_expired(&self) -> bool {
        !self.is_active()
    }

    /// Whether a refresh attempt is worthwhile.
    pub fn is_refreshable(&self) -> bool {
        matches!(self, Self::ExpiredRefreshable)
    }
}

/// Classify `entity` at `now`.
///
/// An expiry equal to `now` counts as expired.
pub fn classify<E: HasExpiry + ?Sized>(entity: &E, now: DateTime<Utc>) -> ExpiryStatus {
    match entity.expires_at() {
        Some(expires_at) if expires_at <= now => {
            if entity.refresh_token().is_some() {
                ExpiryStatus::ExpiredRefreshable
            } else {
                ExpiryStatus::ExpiredDead
            }
        }
        _ => ExpiryStatus::Active,
    }
}

/// Whole seconds until `entity` expires, rounded up.
///
/// Returns `Some(0)` once expired and `None` when no expiry is set.
pub fn expires_in<E: HasExpiry + ?Sized>(entity: &E, now: DateTime<Utc>) -> Option<i64> {
    entity.expires_at().map(|expires_at| {
        let remaining_ms = (expires_at - now).num_milliseconds();
        if remaining_ms <= 0 {
            0
        } else {
            (remaining_ms + 999) / 1000
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    struct Record {
        expires_at: Option<DateTime<Utc>>,
        refresh_token: Option<String>,
    }

    impl HasExpiry for Record {
        fn expires_at(&self) -> Option<DateTime<Utc>> {
            self.expires_at
        }

        fn refresh_token(&self) -> Option<&str> {
            self.refresh_token.as_deref()
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_no_expiry_is_always_active() {
        let record = Record {
            expires_at: None,
            refresh_token: None,
        };
        assert_eq!(classify(&record, now()), ExpiryStatus::Active);
        assert_eq!(
            classify(&record, now() + Duration::days(36_500)),
            ExpiryStatus::Active
        );
        assert_eq!(expires_in(&record, now()), None);
    }

    #[test]
    fn test_future_expiry_is_active() {
        let record = Record {
            expires_at: Some(now() + Duration::seconds(1)),
            refresh_token: None,
        };
        assert_eq!(classify(&record, now()), ExpiryStatus::Active);
    }

    #[test]
    fn test_expiry_equal_to_now_is_expired() {
        let dead = Record {
            expires_at: Some(now()),
            refresh_token: None,
        };
        assert_eq!(classify(&dead, now()), ExpiryStatus::ExpiredDead);

        let refreshable = Record {
            expires_at: Some(now()),
            refresh_token: Some("refresh".to_string()),
        };
        assert_eq!(
            classify(&refreshable, now()),
            ExpiryStatus::ExpiredRefreshable
        );
    }

    #[test]
    fn test_past_expiry_depends_on_refresh_token() {
        let mut record = Record {
            expires_at: Some(now() - Duration::days(1)),
            refresh_token: Some("refresh".to_string()),
        };
        let status = classify(&record, now());
        assert!(status.is_expired());
        assert!(status.is_refreshable());

        record.refresh_token = None;
        let status = classify(&record, now());
        assert_eq!(status, ExpiryStatus::ExpiredDead);
        assert!(!status.is_refreshable());
    }

    #[test]
    fn test_expires_in_rounds_up() {
        let record = Record {
            expires_at: Some(now() + Duration::milliseconds(1500)),
            refresh_token: None,
        };
        assert_eq!(expires_in(&record, now()), Some(2));
        assert_eq!(
            expires_in(&record, now() + Duration::milliseconds(1500)),
            Some(0)
        );
        assert_eq!(expires_in(&record, now() + Duration::hours(1)), Some(0));
    }
}
