//! The settlement engine.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use stockledger_auth::{authorize, Operation, Principal, Resource};
use stockledger_catalog::CounterpartyKind;
use stockledger_core::{IdempotencyKey, Money};
use stockledger_orders::{OrderDraft, OrderId, OrderKind, OrderNumber};
use stockledger_store::InMemoryStore;

use crate::error::SettlementError;

/// Outcome of a successful settlement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettledOrder {
    pub order_id: OrderId,
    pub number: OrderNumber,
    pub total_amount: Money,
    /// Unpaid remainder applied to the counterparty's debt balance.
    pub outstanding: Money,
    /// True when the idempotency key had already settled and no new effect
    /// was applied.
    pub already_settled: bool,
}

/// Executes the settlement write sequence atomically.
///
/// Ordering within the transaction mirrors the required visibility order:
/// header before lines (they travel as one record), lines before stock,
/// stock before debt. Because the transaction commits or discards as a whole,
/// intermediate states are never observable.
pub struct SettlementEngine {
    store: Arc<InMemoryStore>,
}

impl SettlementEngine {
    pub fn new(store: Arc<InMemoryStore>) -> Self {
        Self { store }
    }

    pub fn settle(
        &self,
        by: &Principal,
        draft: OrderDraft,
        paid_amount: Money,
        key: IdempotencyKey,
    ) -> Result<SettledOrder, SettlementError> {
        let resource = match draft.kind {
            OrderKind::Purchase => Resource::PurchaseOrders,
            OrderKind::Sales => Resource::SalesOrders,
        };
        authorize(by.role, resource, Operation::Insert)?;

        if paid_amount.is_negative() {
            return Err(SettlementError::Validation(
                "paid_amount must not be negative".to_string(),
            ));
        }
        if paid_amount > draft.total_amount {
            return Err(SettlementError::Validation(
                "paid_amount must not exceed the order total".to_string(),
            ));
        }
        let outstanding = draft.total_amount.checked_sub(paid_amount)?;

        let number = draft.number.clone();
        let result = self.store.transaction(|txn| {
            if let Some(existing) = txn.settled_order_for(key) {
                let order = txn.order(existing).ok_or_else(|| {
                    SettlementError::Persistence(
                        "idempotency record references a missing order".to_string(),
                    )
                })?;
                let outstanding = order.outstanding()?;
                return Ok(SettledOrder {
                    order_id: order.id,
                    number: order.number,
                    total_amount: order.total_amount,
                    outstanding,
                    already_settled: true,
                });
            }

            // Counterparty must exist and sit on the right side of the order
            // before anything is written.
            if let Some(cp_id) = draft.counterparty_id {
                let counterparty = txn
                    .counterparty(cp_id)
                    .ok_or_else(|| SettlementError::NotFound(format!("counterparty {cp_id}")))?;
                let expected = match draft.kind {
                    OrderKind::Purchase => CounterpartyKind::Supplier,
                    OrderKind::Sales => CounterpartyKind::Customer,
                };
                if counterparty.kind != expected {
                    return Err(SettlementError::Validation(format!(
                        "{} orders settle against a {}, got a {}",
                        draft.kind,
                        expected,
                        counterparty.kind
                    )));
                }
            }

            // Re-verify sales stock against current state. The composer's
            // check ran against a possibly stale read; this one is the
            // authoritative gate.
            let quantities = draft.quantities_by_product();
            for (&product_id, &quantity) in &quantities {
                let product = txn
                    .product(product_id)
                    .ok_or_else(|| SettlementError::NotFound(format!("product {product_id}")))?;
                if draft.kind == OrderKind::Sales && quantity > product.stock_quantity {
                    return Err(SettlementError::Validation(format!(
                        "insufficient stock for '{}': requested {}, available {}",
                        product.sku, quantity, product.stock_quantity
                    )));
                }
            }

            let kind = draft.kind;
            let order = draft.settled(OrderId::new(), paid_amount, Utc::now());
            let order_id = order.id;
            let number = order.number.clone();
            let total_amount = order.total_amount;
            let counterparty_id = order.counterparty_id;

            txn.insert_order(order)?;
            for (&product_id, &quantity) in &quantities {
                txn.adjust_stock(product_id, kind.stock_delta(quantity))?;
            }
            if let Some(cp_id) = counterparty_id {
                txn.adjust_debt(cp_id, outstanding)?;
            }
            txn.record_settlement(key, order_id);

            Ok(SettledOrder {
                order_id,
                number,
                total_amount,
                outstanding,
                already_settled: false,
            })
        });

        match &result {
            Ok(settled) if settled.already_settled => {
                info!(number = %settled.number, "settlement replayed for known idempotency key");
            }
            Ok(settled) => {
                info!(
                    number = %settled.number,
                    total = %settled.total_amount,
                    outstanding = %settled.outstanding,
                    "order settled"
                );
            }
            Err(err) => {
                warn!(number = %number, error = %err, "settlement failed, nothing applied");
            }
        }
        result
    }
}
