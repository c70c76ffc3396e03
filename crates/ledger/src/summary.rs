//! Dashboard and debts-view aggregates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockledger_catalog::{CashFlow, CounterpartyKind, PaymentType};
use stockledger_core::{DomainResult, Money};
use stockledger_orders::{OrderId, OrderKind, OrderNumber, OrderStatus};
use stockledger_store::StoreSnapshot;

/// A recent order, newest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentOrder {
    pub id: OrderId,
    pub number: OrderNumber,
    pub kind: OrderKind,
    pub status: OrderStatus,
    pub total_amount: Money,
    pub order_date: DateTime<Utc>,
}

/// The dashboard aggregate set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSummary {
    pub taken_at: DateTime<Utc>,
    pub total_products: usize,
    pub low_stock_products: usize,
    pub completed_purchase_total: Money,
    pub completed_sales_total: Money,
    pub customer_debt_total: Money,
    pub supplier_debt_total: Money,
    pub cash_income_total: Money,
    pub cash_expense_total: Money,
    pub purchase_payments_total: Money,
    pub sales_payments_total: Money,
    pub recent_orders: Vec<RecentOrder>,
}

/// Sum of order totals for a kind/status pair.
pub fn order_total(
    snapshot: &StoreSnapshot,
    kind: OrderKind,
    status: OrderStatus,
) -> DomainResult<Money> {
    snapshot
        .orders
        .iter()
        .filter(|o| o.kind == kind && o.status == status)
        .try_fold(Money::ZERO, |acc, o| acc.checked_add(o.total_amount))
}

/// Sum of debt balances for one counterparty class.
pub fn outstanding_debt(snapshot: &StoreSnapshot, kind: CounterpartyKind) -> DomainResult<Money> {
    snapshot
        .counterparties
        .iter()
        .filter(|cp| cp.kind == kind)
        .try_fold(Money::ZERO, |acc, cp| acc.checked_add(cp.debt_balance))
}

fn cash_total(snapshot: &StoreSnapshot, flow: CashFlow) -> DomainResult<Money> {
    snapshot
        .cash_transactions
        .iter()
        .filter(|t| t.flow == flow)
        .try_fold(Money::ZERO, |acc, t| acc.checked_add(t.amount))
}

/// Sum of recorded payments of one type.
pub fn payment_total(snapshot: &StoreSnapshot, payment_type: PaymentType) -> DomainResult<Money> {
    snapshot
        .payments
        .iter()
        .filter(|p| p.payment_type == payment_type)
        .try_fold(Money::ZERO, |acc, p| acc.checked_add(p.amount))
}

/// The `limit` most recent orders by creation order, newest first.
pub fn recent_orders(snapshot: &StoreSnapshot, limit: usize) -> Vec<RecentOrder> {
    let mut orders: Vec<&stockledger_orders::Order> = snapshot.orders.iter().collect();
    orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.0.cmp(&a.id.0)));
    orders
        .into_iter()
        .take(limit)
        .map(|o| RecentOrder {
            id: o.id,
            number: o.number.clone(),
            kind: o.kind,
            status: o.status,
            total_amount: o.total_amount,
            order_date: o.order_date,
        })
        .collect()
}

/// Compute the full dashboard aggregate set from one snapshot.
pub fn summarize(snapshot: &StoreSnapshot, recent_limit: usize) -> DomainResult<LedgerSummary> {
    Ok(LedgerSummary {
        taken_at: snapshot.taken_at,
        total_products: snapshot.products.len(),
        low_stock_products: snapshot.products.iter().filter(|p| p.is_low_stock()).count(),
        completed_purchase_total: order_total(
            snapshot,
            OrderKind::Purchase,
            OrderStatus::Completed,
        )?,
        completed_sales_total: order_total(snapshot, OrderKind::Sales, OrderStatus::Completed)?,
        customer_debt_total: outstanding_debt(snapshot, CounterpartyKind::Customer)?,
        supplier_debt_total: outstanding_debt(snapshot, CounterpartyKind::Supplier)?,
        cash_income_total: cash_total(snapshot, CashFlow::Income)?,
        cash_expense_total: cash_total(snapshot, CashFlow::Expense)?,
        purchase_payments_total: payment_total(snapshot, PaymentType::Purchase)?,
        sales_payments_total: payment_total(snapshot, PaymentType::Sale)?,
        recent_orders: recent_orders(snapshot, recent_limit),
    })
}
