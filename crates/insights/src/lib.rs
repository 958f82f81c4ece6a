//! Derived insight collections (alerts, predictions, suggestions).
//!
//! Everything in this crate is a pure function of an equipment snapshot:
//! each cycle replaces the previous collection wholesale instead of mutating
//! long-lived entries, so stale-entry bugs cannot occur and no deduplication
//! against previously-surfaced items is needed. Randomized draws take an
//! injected generator so tests can seed them.

pub mod alerts;
pub mod predictions;
pub mod suggestions;

pub use alerts::{generate_alerts, AlertCategory, AlertPriority, SmartAlert, LOW_STOCK_THRESHOLD};
pub use predictions::{generate_predictions, PredictionEntry};
pub use suggestions::{
    generate_suggestions, EquipmentUsage, SmartSuggestion, SuggestionKind, UsageStatus,
};
