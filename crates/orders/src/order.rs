//! Orders and order lines.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockledger_catalog::{CounterpartyId, ProductId};
use stockledger_core::{DomainError, DomainResult, Money, RecordId, UserId};

use crate::number::OrderNumber;

/// Order identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(pub RecordId);

impl OrderId {
    pub fn new() -> Self {
        Self(RecordId::new())
    }
}

impl Default for OrderId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for OrderId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Purchase (stock in, supplier side) or sales (stock out, customer side).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderKind {
    Purchase,
    Sales,
}

impl OrderKind {
    pub fn prefix(&self) -> &'static str {
        match self {
            OrderKind::Purchase => "PO",
            OrderKind::Sales => "SO",
        }
    }

    /// Signed stock delta for a settled line of `quantity` units.
    pub fn stock_delta(&self, quantity: i64) -> i64 {
        match self {
            OrderKind::Purchase => quantity,
            OrderKind::Sales => -quantity,
        }
    }
}

impl core::fmt::Display for OrderKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.prefix())
    }
}

/// Order status lifecycle.
///
/// Cancellation is a status flag only: it does not reverse stock or debt.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Completed,
    Cancelled,
}

/// One order line. `total_price` is computed exactly once at construction and
/// always equals `quantity × unit_price` to the cent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub product_id: ProductId,
    pub quantity: i64,
    pub unit_price: Money,
    pub total_price: Money,
}

impl OrderLine {
    pub fn new(product_id: ProductId, quantity: i64, unit_price: Money) -> DomainResult<Self> {
        if quantity <= 0 {
            return Err(DomainError::validation("quantity must be positive"));
        }
        if unit_price.is_negative() {
            return Err(DomainError::validation("unit_price must not be negative"));
        }
        let total_price = unit_price.checked_mul_qty(quantity)?;
        Ok(Self {
            product_id,
            quantity,
            unit_price,
            total_price,
        })
    }
}

/// A persisted order: header plus lines, created as a unit by settlement and
/// never edited afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub number: OrderNumber,
    pub kind: OrderKind,
    pub counterparty_id: Option<CounterpartyId>,
    pub order_date: DateTime<Utc>,
    pub lines: Vec<OrderLine>,
    pub total_amount: Money,
    pub paid_amount: Money,
    pub discount: Money,
    pub status: OrderStatus,
    pub notes: Option<String>,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Unpaid remainder: `total_amount - paid_amount`.
    pub fn outstanding(&self) -> DomainResult<Money> {
        self.total_amount.checked_sub(self.paid_amount)
    }

    /// Flip the status to cancelled. Stock and debt stay as settled.
    pub fn cancel(&mut self) -> DomainResult<()> {
        if self.status == OrderStatus::Cancelled {
            return Err(DomainError::conflict("order is already cancelled"));
        }
        self.status = OrderStatus::Cancelled;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_total_is_quantity_times_unit_price() {
        let line = OrderLine::new(ProductId::new(), 3, Money::from_minor(499)).unwrap();
        assert_eq!(line.total_price, Money::from_minor(1497));
    }

    #[test]
    fn line_rejects_non_positive_quantity() {
        assert!(OrderLine::new(ProductId::new(), 0, Money::from_major(1)).is_err());
        assert!(OrderLine::new(ProductId::new(), -2, Money::from_major(1)).is_err());
    }

    #[test]
    fn stock_delta_sign_follows_order_kind() {
        assert_eq!(OrderKind::Purchase.stock_delta(4), 4);
        assert_eq!(OrderKind::Sales.stock_delta(4), -4);
    }
}
