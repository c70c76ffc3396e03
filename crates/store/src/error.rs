//! Store error model.

use thiserror::Error;

use stockledger_auth::AuthzError;
use stockledger_core::DomainError;

/// Failure of a store operation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Uniqueness violation (sku, email, order number, id).
    #[error("duplicate {field}: {value}")]
    Duplicate { field: &'static str, value: String },

    /// A referenced row is absent.
    #[error("not found: {0}")]
    NotFound(String),

    /// Deletion blocked: the row is referenced by existing orders.
    #[error("cannot delete: {0}")]
    Referenced(String),

    /// The store's defense-in-depth policy re-check rejected the caller.
    #[error(transparent)]
    Forbidden(#[from] AuthzError),

    /// The store lock was poisoned by a panicking writer.
    #[error("store lock poisoned")]
    Poisoned,

    /// A domain rule failed while applying the write (validation, version
    /// conflict, balance invariant).
    #[error(transparent)]
    Domain(#[from] DomainError),
}
