//! Settlement error taxonomy.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use stockledger_auth::AuthzError;
use stockledger_core::DomainError;
use stockledger_store::StoreError;

/// A step of the settlement write sequence, in execution order.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettlementStep {
    HeaderPersisted,
    LinesPersisted,
    StockAdjusted,
    DebtAdjusted,
}

/// Failure of a settlement attempt.
///
/// `Validation` and `Authorization` are recoverable: correct the input or the
/// role and retry from scratch. `PartialSettlement` is NOT safely retryable —
/// it reports which steps already applied so an operator can reconcile. The
/// transactional store never produces it (a failed transaction applies
/// nothing); the variant exists for non-atomic backends and operator tooling,
/// which must be able to tell a torn settlement from a clean failure.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SettlementError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error(transparent)]
    Authorization(#[from] AuthzError),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("persistence failed: {0}")]
    Persistence(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("partial settlement: completed steps {completed:?}")]
    PartialSettlement { completed: Vec<SettlementStep> },
}

impl From<DomainError> for SettlementError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg)
            | DomainError::InvariantViolation(msg)
            | DomainError::InvalidId(msg) => SettlementError::Validation(msg),
            DomainError::NotFound(what) => SettlementError::NotFound(what),
            DomainError::Conflict(msg) => SettlementError::Conflict(msg),
            DomainError::Unauthorized => {
                SettlementError::Persistence("store rejected the caller".to_string())
            }
        }
    }
}

impl From<StoreError> for SettlementError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate { field, value } => {
                SettlementError::Conflict(format!("duplicate {field}: {value}"))
            }
            StoreError::NotFound(what) => SettlementError::NotFound(what),
            StoreError::Referenced(msg) => SettlementError::Conflict(msg),
            StoreError::Forbidden(authz) => SettlementError::Authorization(authz),
            StoreError::Poisoned => {
                SettlementError::Persistence("store lock poisoned".to_string())
            }
            StoreError::Domain(domain) => domain.into(),
        }
    }
}
