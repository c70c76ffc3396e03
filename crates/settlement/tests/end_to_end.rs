//! Black-box flow: seed catalog, compose, settle, query the ledger.

use std::sync::Arc;

use chrono::Utc;

use stockledger_auth::{Principal, Profile, Role};
use stockledger_catalog::{
    CashFlow, CashTransaction, CashTransactionId, Counterparty, CounterpartyId, CounterpartyKind,
    Payment, PaymentId, PaymentMethod, PaymentType, Product, ProductId,
};
use stockledger_core::{IdempotencyKey, Money, UserId};
use stockledger_ledger::summarize;
use stockledger_orders::{DraftSpec, LineInput, OrderComposer, OrderKind};
use stockledger_settlement::SettlementEngine;
use stockledger_store::InMemoryStore;

struct World {
    store: Arc<InMemoryStore>,
    engine: SettlementEngine,
    manager: Principal,
}

fn world() -> World {
    stockledger_observability::init();

    let store = Arc::new(InMemoryStore::new());
    let engine = SettlementEngine::new(Arc::clone(&store));

    let user_id = UserId::new();
    let profile = Profile::new(
        user_id,
        "manager@example.com",
        "Floor Manager",
        Role::Manager,
        Utc::now(),
    )
    .unwrap();
    store.insert_profile(profile).unwrap();

    // Resolve the caller from the registered profile, as a session layer would.
    let manager = store.profile(user_id).unwrap().unwrap().principal();

    World {
        store,
        engine,
        manager,
    }
}

fn seed_product(w: &World, sku: &str, stock: i64, price_minor: i64) -> ProductId {
    let product = Product::new(
        ProductId::new(),
        sku,
        format!("{sku} name"),
        None,
        "pcs",
        Money::from_minor(price_minor / 2),
        Money::from_minor(price_minor),
        stock,
        3,
        Utc::now(),
    )
    .unwrap();
    let id = product.id;
    w.store.insert_product(&w.manager, product).unwrap();
    id
}

fn seed_counterparty(w: &World, kind: CounterpartyKind) -> CounterpartyId {
    let cp = Counterparty::new(CounterpartyId::new(), kind, "Partner", Utc::now()).unwrap();
    let id = cp.id;
    w.store.insert_counterparty(&w.manager, cp).unwrap();
    id
}

fn settle(
    w: &World,
    kind: OrderKind,
    counterparty: Option<CounterpartyId>,
    lines: Vec<LineInput>,
    discount: Money,
    paid: Money,
) -> stockledger_settlement::SettledOrder {
    let composer = OrderComposer::new(w.store.as_ref(), w.store.as_ref());
    let draft = composer
        .compose(DraftSpec {
            kind,
            counterparty_id: counterparty,
            lines,
            discount,
            order_date: Utc::now(),
            notes: None,
            created_by: w.manager.user_id,
        })
        .unwrap();
    w.engine
        .settle(&w.manager, draft, paid, IdempotencyKey::new())
        .unwrap()
}

#[test]
fn restock_then_sell_then_report() {
    let w = world();
    let product = seed_product(&w, "WID-1", 0, 1500);
    let supplier = seed_counterparty(&w, CounterpartyKind::Supplier);
    let customer = seed_counterparty(&w, CounterpartyKind::Customer);

    // Restock: 20 units at 10.00 cost, half paid.
    let purchase = settle(
        &w,
        OrderKind::Purchase,
        Some(supplier),
        vec![LineInput {
            product_id: product,
            quantity: 20,
            unit_price: Money::from_major(10),
        }],
        Money::ZERO,
        Money::from_major(100),
    );
    assert_eq!(purchase.total_amount, Money::from_major(200));
    assert_eq!(purchase.outstanding, Money::from_major(100));

    // Sell 6 at 15.00 with a 5.00 discount, unpaid.
    let sale = settle(
        &w,
        OrderKind::Sales,
        Some(customer),
        vec![LineInput {
            product_id: product,
            quantity: 6,
            unit_price: Money::from_minor(1500),
        }],
        Money::from_major(5),
        Money::ZERO,
    );
    assert_eq!(sale.total_amount, Money::from_minor(8500));

    // Record the supplier installment and the rent for the month.
    w.store
        .record_payment(
            &w.manager,
            Payment::new(
                PaymentId::new(),
                PaymentType::Purchase,
                purchase.order_id.0,
                Money::from_major(100),
                PaymentMethod::BankTransfer,
                Utc::now(),
                w.manager.user_id,
                Utc::now(),
            )
            .unwrap(),
        )
        .unwrap();
    w.store
        .record_cash_transaction(
            &w.manager,
            CashTransaction::new(
                CashTransactionId::new(),
                CashFlow::Expense,
                "rent",
                Money::from_major(80),
                Utc::now(),
                w.manager.user_id,
                Utc::now(),
            )
            .unwrap(),
        )
        .unwrap();

    let summary = summarize(&w.store.snapshot().unwrap(), 10).unwrap();
    assert_eq!(summary.total_products, 1);
    assert_eq!(summary.low_stock_products, 0); // 14 units left, threshold 3
    assert_eq!(summary.completed_purchase_total, Money::from_major(200));
    assert_eq!(summary.completed_sales_total, Money::from_minor(8500));
    assert_eq!(summary.supplier_debt_total, Money::from_major(100));
    assert_eq!(summary.customer_debt_total, Money::from_minor(8500));
    assert_eq!(summary.purchase_payments_total, Money::from_major(100));
    assert_eq!(summary.sales_payments_total, Money::ZERO);
    assert_eq!(summary.cash_expense_total, Money::from_major(80));
    assert_eq!(summary.recent_orders.len(), 2);

    // Newest first: the sale settled after the purchase.
    assert_eq!(summary.recent_orders[0].id, sale.order_id);
}

#[test]
fn ledger_sees_each_settlement_exactly_once() {
    let w = world();
    let product = seed_product(&w, "WID-2", 10, 900);
    let customer = seed_counterparty(&w, CounterpartyKind::Customer);

    let composer = OrderComposer::new(w.store.as_ref(), w.store.as_ref());
    let draft = composer
        .compose(DraftSpec {
            kind: OrderKind::Sales,
            counterparty_id: Some(customer),
            lines: vec![LineInput {
                product_id: product,
                quantity: 2,
                unit_price: Money::from_minor(900),
            }],
            discount: Money::ZERO,
            order_date: Utc::now(),
            notes: None,
            created_by: w.manager.user_id,
        })
        .unwrap();

    // A client resubmission with the same token must not double-settle.
    let key = IdempotencyKey::new();
    w.engine
        .settle(&w.manager, draft.clone(), Money::ZERO, key)
        .unwrap();
    w.engine.settle(&w.manager, draft, Money::ZERO, key).unwrap();

    let summary = summarize(&w.store.snapshot().unwrap(), 10).unwrap();
    assert_eq!(summary.completed_sales_total, Money::from_minor(1800));
    assert_eq!(summary.customer_debt_total, Money::from_minor(1800));
    assert_eq!(summary.recent_orders.len(), 1);
}
