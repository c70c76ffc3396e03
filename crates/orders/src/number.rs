//! Human-readable order numbers.
//!
//! Numbers are issued from a store-side monotonic sequence per order kind
//! (`PO-000001`, `SO-000017`, ...). A timestamp-derived scheme collides under
//! concurrent submission within one millisecond; a sequence cannot.

use serde::{Deserialize, Serialize};

use stockledger_core::DomainResult;

use crate::order::OrderKind;

/// Globally unique, human-readable order number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderNumber(String);

impl OrderNumber {
    /// Format a sequence value under a kind prefix.
    pub fn compose(kind: OrderKind, sequence: u64) -> Self {
        Self(format!("{}-{:06}", kind.prefix(), sequence))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for OrderNumber {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Issues the next order number for a kind. Implemented by the store so the
/// sequence survives alongside the data it numbers.
pub trait OrderNumberSource {
    fn next_order_number(&self, kind: OrderKind) -> DomainResult<OrderNumber>;
}
