//! Product master record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockledger_core::{DomainError, DomainResult, Money, RecordId};

use crate::category::CategoryId;

/// Product identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub RecordId);

impl ProductId {
    pub fn new() -> Self {
        Self(RecordId::new())
    }
}

impl Default for ProductId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for ProductId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// A stocked product.
///
/// `stock_quantity` is mutated by the settlement engine on every order line;
/// everything else is catalog management. Stock is in whole units of
/// `unit_of_measure`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub sku: String,
    pub name: String,
    pub category_id: Option<CategoryId>,
    pub unit_of_measure: String,
    pub cost_price: Money,
    pub selling_price: Money,
    pub stock_quantity: i64,
    pub min_stock_level: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: ProductId,
        sku: impl Into<String>,
        name: impl Into<String>,
        category_id: Option<CategoryId>,
        unit_of_measure: impl Into<String>,
        cost_price: Money,
        selling_price: Money,
        stock_quantity: i64,
        min_stock_level: i64,
        created_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let sku = sku.into();
        let name = name.into();

        if sku.trim().is_empty() {
            return Err(DomainError::validation("sku must not be empty"));
        }
        if name.trim().is_empty() {
            return Err(DomainError::validation("product name must not be empty"));
        }
        if cost_price.is_negative() || selling_price.is_negative() {
            return Err(DomainError::validation("prices must not be negative"));
        }
        if stock_quantity < 0 {
            return Err(DomainError::validation("stock_quantity must not be negative"));
        }
        if min_stock_level < 0 {
            return Err(DomainError::validation("min_stock_level must not be negative"));
        }

        Ok(Self {
            id,
            sku,
            name,
            category_id,
            unit_of_measure: unit_of_measure.into(),
            cost_price,
            selling_price,
            stock_quantity,
            min_stock_level,
            created_at,
            updated_at: created_at,
        })
    }

    /// At or below the reorder threshold.
    pub fn is_low_stock(&self) -> bool {
        self.stock_quantity <= self.min_stock_level
    }

    /// Apply a signed stock delta. Stock must never end up negative; the
    /// settlement engine re-verifies sales quantities inside its transaction
    /// before calling this.
    pub fn apply_stock_delta(&mut self, delta: i64, at: DateTime<Utc>) -> DomainResult<()> {
        let next = self
            .stock_quantity
            .checked_add(delta)
            .ok_or_else(|| DomainError::invariant("stock_quantity overflow"))?;
        if next < 0 {
            return Err(DomainError::invariant(format!(
                "stock for '{}' would go negative ({} {:+})",
                self.sku, self.stock_quantity, delta
            )));
        }
        self.stock_quantity = next;
        self.updated_at = at;
        Ok(())
    }
}

/// Read seam for components that only need product lookups (the order
/// composer validates line inputs through this, never through the full store).
pub trait ProductReader {
    fn product(&self, id: ProductId) -> Option<Product>;
}
