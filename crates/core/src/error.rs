//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Deterministic business failures only (validation, invariants, conflicts).
/// Store and settlement layers wrap these in their own error types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Bad input: empty line list, non-positive quantity, stock shortfall, ...
    #[error("validation failed: {0}")]
    Validation(String),

    /// A domain invariant was violated (e.g. a balance would overflow).
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    /// An identifier failed to parse.
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// A referenced product/counterparty/order is absent.
    #[error("not found: {0}")]
    NotFound(String),

    /// Stale version or uniqueness clash.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The caller's role does not permit the operation.
    #[error("unauthorized")]
    Unauthorized,
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }
}
