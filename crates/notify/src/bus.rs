use chrono::{DateTime, Utc};

use crate::notification::{Notification, NotificationId, Severity};

/// In-memory notification queue.
///
/// - No IO / no async
/// - Ids are monotonic within one bus instance
/// - Expiry is deadline-driven: `sweep(now)` drops every entry past its TTL,
///   so callers (the engine's sweep task, or tests with virtual time) decide
///   when time advances.
#[derive(Debug, Clone, Default)]
pub struct NotificationBus {
    next_id: u64,
    entries: Vec<Notification>,
}

impl NotificationBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish a notification; returns its id.
    pub fn push(
        &mut self,
        message: impl Into<String>,
        severity: Severity,
        now: DateTime<Utc>,
    ) -> NotificationId {
        self.next_id += 1;
        let id = NotificationId(self.next_id);
        self.entries
            .push(Notification::new(id, message.into(), severity, now));
        id
    }

    /// Drop every notification past its removal deadline.
    ///
    /// Idempotent: sweeping twice at the same instant removes nothing the
    /// second time, and sweeping an id that another path already removed is a
    /// no-op.
    pub fn sweep(&mut self, now: DateTime<Utc>) -> usize {
        let before = self.entries.len();
        self.entries.retain(|n| now < n.expires_at);
        before - self.entries.len()
    }

    /// Mark a notification as read. Absent ids are a silent no-op.
    pub fn mark_read(&mut self, id: NotificationId) {
        if let Some(notification) = self.entries.iter_mut().find(|n| n.id == id) {
            notification.read = true;
        }
    }

    pub fn all(&self) -> &[Notification] {
        &self.entries
    }

    pub fn unread_count(&self) -> usize {
        self.entries.iter().filter(|n| !n.read).count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn test_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 5, 4, 12, 0, 0).unwrap()
    }

    #[test]
    fn ids_are_monotonic() {
        let mut bus = NotificationBus::new();
        let a = bus.push("premier", Severity::Info, test_time());
        let b = bus.push("second", Severity::Success, test_time());
        assert!(b > a);
    }

    #[test]
    fn sweep_removes_entries_only_after_ttl() {
        let mut bus = NotificationBus::new();
        let t0 = test_time();
        bus.push("Commande envoyée avec succès!", Severity::Success, t0);

        assert_eq!(bus.sweep(t0 + Duration::milliseconds(2900)), 0);
        assert_eq!(bus.len(), 1);

        assert_eq!(bus.sweep(t0 + Duration::milliseconds(3100)), 1);
        assert!(bus.is_empty());
    }

    #[test]
    fn sweep_ignores_read_state() {
        let mut bus = NotificationBus::new();
        let t0 = test_time();
        let id = bus.push("Stock bas pour Oscilloscope (2 restants)", Severity::Warning, t0);
        bus.mark_read(id);

        assert_eq!(bus.sweep(t0 + Duration::seconds(4)), 1);
        assert!(bus.is_empty());
    }

    #[test]
    fn sweep_is_idempotent() {
        let mut bus = NotificationBus::new();
        let t0 = test_time();
        bus.push("Demande refusée", Severity::Error, t0);

        let later = t0 + Duration::seconds(5);
        assert_eq!(bus.sweep(later), 1);
        assert_eq!(bus.sweep(later), 0);
    }

    #[test]
    fn mark_read_on_absent_id_is_a_no_op() {
        let mut bus = NotificationBus::new();
        bus.mark_read(NotificationId(42));
        assert!(bus.is_empty());

        let t0 = test_time();
        let id = bus.push("Quantité mise à jour", Severity::Success, t0);
        bus.mark_read(id);
        assert_eq!(bus.unread_count(), 0);
        assert_eq!(bus.len(), 1);
    }
}
