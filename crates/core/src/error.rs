//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic, business/domain failures. Collaborator
/// failures (persistence, network) are wrapped as `Upstream` at the engine
/// boundary and must never leave local state partially mutated.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (e.g. malformed input to a create operation).
    #[error("validation failed: {0}")]
    Validation(String),

    /// A mutation would drive an equipment quantity below zero.
    ///
    /// The ledger is left unchanged when this is returned.
    #[error("stock cannot go negative (current: {current}, delta: {delta})")]
    NegativeStock { current: u32, delta: i64 },

    /// An operation referenced an absent equipment/request/technician id.
    ///
    /// Workflow-layer callers treat this as a silent no-op, since the UI may
    /// be acting on stale data.
    #[error("not found")]
    NotFound,

    /// A persistence/network collaborator failed.
    #[error("upstream failure: {0}")]
    Upstream(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn negative_stock(current: u32, delta: i64) -> Self {
        Self::NegativeStock { current, delta }
    }

    pub fn not_found() -> Self {
        Self::NotFound
    }

    pub fn upstream(msg: impl Into<String>) -> Self {
        Self::Upstream(msg.into())
    }

    /// Whether this error is the treat-as-no-op case at the workflow layer.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }
}
