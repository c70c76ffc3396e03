//! Optimistic concurrency primitives for row-versioned store writes.

use crate::error::{DomainError, DomainResult};

/// Version expectation for a row update.
///
/// Stock and debt adjustments inside a settlement transaction run under the
/// store's write lock and use `Any`; direct administrative edits should pass
/// `Exact` so concurrent edits surface as conflicts instead of lost updates.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ExpectedVersion {
    /// Skip version checking.
    Any,
    /// Require the row to be at an exact version.
    Exact(u64),
}

impl ExpectedVersion {
    pub fn matches(self, actual: u64) -> bool {
        match self {
            ExpectedVersion::Any => true,
            ExpectedVersion::Exact(v) => v == actual,
        }
    }

    pub fn check(self, actual: u64) -> DomainResult<()> {
        if self.matches(actual) {
            Ok(())
        } else {
            Err(DomainError::conflict(format!(
                "optimistic concurrency check failed (expected: {self:?}, actual: {actual})"
            )))
        }
    }
}
