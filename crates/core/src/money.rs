//! Fixed-point money: `i64` minor units, exactly two fractional digits.
//!
//! All monetary amounts in the system (prices, totals, debt balances) use
//! this type. No floats; arithmetic is checked and overflow surfaces as a
//! domain invariant violation rather than wrapping.

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// A signed fixed-point amount in minor currency units (e.g. cents).
#[derive(
    Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    /// Construct from minor units (e.g. `from_minor(1050)` is 10.50).
    pub const fn from_minor(minor: i64) -> Self {
        Self(minor)
    }

    /// Construct from whole major units (e.g. `from_major(10)` is 10.00).
    /// Saturates at the representable range instead of wrapping.
    pub const fn from_major(major: i64) -> Self {
        Self(major.saturating_mul(100))
    }

    pub const fn minor(self) -> i64 {
        self.0
    }

    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    pub fn checked_add(self, other: Money) -> DomainResult<Money> {
        self.0
            .checked_add(other.0)
            .map(Money)
            .ok_or_else(|| DomainError::invariant("amount overflow in addition"))
    }

    pub fn checked_sub(self, other: Money) -> DomainResult<Money> {
        self.0
            .checked_sub(other.0)
            .map(Money)
            .ok_or_else(|| DomainError::invariant("amount overflow in subtraction"))
    }

    /// Multiply by a unit count (line total = unit price × quantity).
    pub fn checked_mul_qty(self, quantity: i64) -> DomainResult<Money> {
        self.0
            .checked_mul(quantity)
            .map(Money)
            .ok_or_else(|| DomainError::invariant("amount overflow in multiplication"))
    }
}

impl core::fmt::Display for Money {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}
