use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Fixed notification time-to-live, in seconds.
///
/// Auto-removal happens exactly once, after this delay, regardless of the
/// read flag.
pub const NOTIFICATION_TTL_SECS: i64 = 3;

/// Bus-local notification identifier (monotonic).
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NotificationId(pub u64);

impl core::fmt::Display for NotificationId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Notification severity, as rendered by the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
    Success,
}

/// A single ephemeral, human-readable notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    pub message: String,
    pub severity: Severity,
    pub timestamp: DateTime<Utc>,
    pub read: bool,
    /// Removal deadline (`timestamp` + TTL), checked by the bus sweep.
    pub expires_at: DateTime<Utc>,
}

impl Notification {
    pub(crate) fn new(
        id: NotificationId,
        message: String,
        severity: Severity,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            message,
            severity,
            timestamp: now,
            read: false,
            expires_at: now + Duration::seconds(NOTIFICATION_TTL_SECS),
        }
    }
}
