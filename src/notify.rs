// src/notify.rs
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

pub const DEFAULT_TTL_SECS: u64 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Success,
    Info,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Success => "success",
            Severity::Info => "info",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            Severity::Error => "#dc3545",
            Severity::Success => "#28a745",
            Severity::Info => "#17a2b8",
        }
    }
}

/// A transient banner message that dismisses itself once `expires_at` passes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub message: String,
    pub severity: Severity,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(message: impl Into<String>, severity: Severity, ttl: std::time::Duration) -> Self {
        Self::at(message, severity, ttl, Utc::now())
    }

    pub fn at(
        message: impl Into<String>,
        severity: Severity,
        ttl: std::time::Duration,
        now: DateTime<Utc>,
    ) -> Self {
        let fallback = Duration::seconds(DEFAULT_TTL_SECS as i64);
        let expires_at = Duration::from_std(ttl)
            .ok()
            .and_then(|ttl| now.checked_add_signed(ttl))
            .unwrap_or(now + fallback);
        Self {
            message: message.into(),
            severity,
            created_at: now,
            expires_at,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Whole seconds the banner stays up.
    pub fn lifetime_secs(&self) -> i64 {
        (self.expires_at - self.created_at).num_seconds()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expiry() {
        let now = Utc::now();
        let n = Notification::at("saved", Severity::Success, std::time::Duration::from_secs(5), now);
        assert!(!n.is_expired(now));
        assert!(!n.is_expired(now + Duration::milliseconds(4999)));
        assert!(n.is_expired(now + Duration::seconds(5)));
    }

    #[test]
    fn test_oversized_ttl_falls_back_to_default() {
        let now = Utc::now();
        let n = Notification::at("x", Severity::Info, std::time::Duration::from_secs(9_000_000_000_000), now);
        assert_eq!(n.lifetime_secs(), DEFAULT_TTL_SECS as i64);
        assert!(n.is_expired(now + Duration::seconds(5)));
    }

    #[test]
    fn test_severity_colors() {
        assert_eq!(Severity::Error.color(), "#dc3545");
        assert_eq!(Severity::Success.color(), "#28a745");
        assert_eq!(Severity::Info.color(), "#17a2b8");
    }
}
