//! Ephemeral user-facing notifications.
//!
//! Every component publishes human-readable events into the bus; the
//! presentation layer only reads from it. Entries are memory-resident and
//! discarded after a fixed TTL regardless of read state: no persistence, no
//! delivery guarantees beyond "visible until swept".

pub mod bus;
pub mod notification;

pub use bus::NotificationBus;
pub use notification::{Notification, NotificationId, Severity, NOTIFICATION_TTL_SECS};
