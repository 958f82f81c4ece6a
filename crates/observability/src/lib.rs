//! `magasin-observability` — logging/metrics/tracing wiring.

pub mod tracing;

pub use crate::tracing::{init, init_with_filter};
