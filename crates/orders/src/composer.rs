//! Order composer: line inputs in, validated draft out.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockledger_catalog::{CounterpartyId, ProductId, ProductReader};
use stockledger_core::{DomainError, DomainResult, Money, UserId};

use crate::number::{OrderNumber, OrderNumberSource};
use crate::order::{Order, OrderId, OrderKind, OrderLine, OrderStatus};

/// Raw line input as the caller supplies it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineInput {
    pub product_id: ProductId,
    pub quantity: i64,
    pub unit_price: Money,
}

/// Everything needed to compose one order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftSpec {
    pub kind: OrderKind,
    pub counterparty_id: Option<CounterpartyId>,
    pub lines: Vec<LineInput>,
    /// Sales only; purchases must pass zero.
    pub discount: Money,
    pub order_date: DateTime<Utc>,
    pub notes: Option<String>,
    pub created_by: UserId,
}

/// A validated, totalled, unpersisted order awaiting settlement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderDraft {
    pub number: OrderNumber,
    pub kind: OrderKind,
    pub counterparty_id: Option<CounterpartyId>,
    pub order_date: DateTime<Utc>,
    pub lines: Vec<OrderLine>,
    pub subtotal: Money,
    pub discount: Money,
    pub total_amount: Money,
    pub notes: Option<String>,
    pub created_by: UserId,
}

impl OrderDraft {
    /// Requested quantity per product, lines for the same product summed.
    pub fn quantities_by_product(&self) -> HashMap<ProductId, i64> {
        let mut totals: HashMap<ProductId, i64> = HashMap::new();
        for line in &self.lines {
            *totals.entry(line.product_id).or_default() += line.quantity;
        }
        totals
    }

    /// Materialize the settled order record (status `completed`).
    pub fn settled(
        self,
        id: OrderId,
        paid_amount: Money,
        created_at: DateTime<Utc>,
    ) -> Order {
        Order {
            id,
            number: self.number,
            kind: self.kind,
            counterparty_id: self.counterparty_id,
            order_date: self.order_date,
            lines: self.lines,
            total_amount: self.total_amount,
            paid_amount,
            discount: self.discount,
            status: OrderStatus::Completed,
            notes: self.notes,
            created_by: self.created_by,
            created_at,
        }
    }
}

/// Builds validated drafts against current catalog state.
///
/// The sales stock check here is advisory (the read may be stale by the time
/// settlement runs); the settlement engine re-verifies inside its
/// transaction, so passing composition never guarantees settlement.
pub struct OrderComposer<'a, R, N> {
    products: &'a R,
    numbers: &'a N,
}

impl<'a, R, N> OrderComposer<'a, R, N>
where
    R: ProductReader,
    N: OrderNumberSource,
{
    pub fn new(products: &'a R, numbers: &'a N) -> Self {
        Self { products, numbers }
    }

    pub fn compose(&self, spec: DraftSpec) -> DomainResult<OrderDraft> {
        if spec.lines.is_empty() {
            return Err(DomainError::validation("order must contain at least one line"));
        }
        if spec.discount.is_negative() {
            return Err(DomainError::validation("discount must not be negative"));
        }
        if spec.kind == OrderKind::Purchase && !spec.discount.is_zero() {
            return Err(DomainError::validation("purchase orders do not carry a discount"));
        }

        let mut lines = Vec::with_capacity(spec.lines.len());
        let mut requested: HashMap<ProductId, i64> = HashMap::new();
        for input in &spec.lines {
            let line = OrderLine::new(input.product_id, input.quantity, input.unit_price)?;
            *requested.entry(line.product_id).or_default() += line.quantity;
            lines.push(line);
        }

        for (&product_id, &quantity) in &requested {
            let product = self.products.product(product_id).ok_or_else(|| {
                DomainError::validation(format!("unknown product: {product_id}"))
            })?;
            if spec.kind == OrderKind::Sales && quantity > product.stock_quantity {
                return Err(DomainError::validation(format!(
                    "insufficient stock for '{}': requested {}, available {}",
                    product.sku, quantity, product.stock_quantity
                )));
            }
        }

        let subtotal = lines
            .iter()
            .try_fold(Money::ZERO, |acc, line| acc.checked_add(line.total_price))?;
        if spec.discount > subtotal {
            return Err(DomainError::validation("discount must not exceed subtotal"));
        }
        let total_amount = subtotal.checked_sub(spec.discount)?;

        let number = self.numbers.next_order_number(spec.kind)?;

        Ok(OrderDraft {
            number,
            kind: spec.kind,
            counterparty_id: spec.counterparty_id,
            order_date: spec.order_date,
            lines,
            subtotal,
            discount: spec.discount,
            total_amount,
            notes: spec.notes,
            created_by: spec.created_by,
        })
    }
}
