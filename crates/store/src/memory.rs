//! In-memory store: row-versioned tables behind a single lock.
//!
//! Writes go through two doors:
//! - direct record operations (insert/update/delete/cancel), each re-checking
//!   the policy matrix before touching a table;
//! - `transaction`, which hands a closure a mutable working copy of the whole
//!   store and swaps it in only when the closure succeeds. Settlement uses
//!   this door; a failure at any step leaves every table untouched.
//!
//! The write lock serializes transactions, so two settlements against the
//! same product cannot interleave their read-modify-write cycles.

use std::collections::{HashMap, HashSet};
use std::sync::{RwLock, RwLockReadGuard};

use chrono::Utc;
use tracing::debug;

use stockledger_auth::{authorize, Operation, Principal, Profile, Resource};
use stockledger_catalog::{
    CashTransaction, CashTransactionId, Category, CategoryId, Counterparty, CounterpartyId,
    CounterpartyKind, Payment, PaymentId, Product, ProductId, ProductReader,
};
use stockledger_core::{
    DomainError, DomainResult, ExpectedVersion, IdempotencyKey, Money, UserId,
};
use stockledger_orders::{Order, OrderId, OrderKind, OrderNumber, OrderNumberSource};

use crate::error::StoreError;
use crate::snapshot::StoreSnapshot;

#[derive(Debug, Clone)]
struct Row<T> {
    record: T,
    version: u64,
}

impl<T> Row<T> {
    fn new(record: T) -> Self {
        Self { record, version: 1 }
    }
}

#[derive(Debug, Default, Clone)]
struct Inner {
    products: HashMap<ProductId, Row<Product>>,
    categories: HashMap<CategoryId, Row<Category>>,
    counterparties: HashMap<CounterpartyId, Row<Counterparty>>,
    orders: HashMap<OrderId, Row<Order>>,
    order_numbers: HashSet<OrderNumber>,
    payments: HashMap<PaymentId, Payment>,
    cash_transactions: HashMap<CashTransactionId, CashTransaction>,
    profiles: HashMap<UserId, Profile>,
    settlements: HashMap<IdempotencyKey, OrderId>,
    purchase_seq: u64,
    sales_seq: u64,
}

impl Inner {
    fn product_referenced(&self, id: ProductId) -> bool {
        self.orders
            .values()
            .any(|row| row.record.lines.iter().any(|line| line.product_id == id))
    }

    fn counterparty_referenced(&self, id: CounterpartyId) -> bool {
        self.orders
            .values()
            .any(|row| row.record.counterparty_id == Some(id))
    }
}

fn counterparty_resource(kind: CounterpartyKind) -> Resource {
    match kind {
        CounterpartyKind::Customer => Resource::Customers,
        CounterpartyKind::Supplier => Resource::Suppliers,
    }
}

fn order_resource(kind: OrderKind) -> Resource {
    match kind {
        OrderKind::Purchase => Resource::PurchaseOrders,
        OrderKind::Sales => Resource::SalesOrders,
    }
}

/// In-memory catalog/order store.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    inner: RwLock<Inner>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Inner>, StoreError> {
        self.inner.read().map_err(|_| StoreError::Poisoned)
    }

    // ── master records ──────────────────────────────────────────────────

    pub fn insert_product(&self, by: &Principal, product: Product) -> Result<(), StoreError> {
        authorize(by.role, Resource::Products, Operation::Insert)?;
        let mut inner = self.inner.write().map_err(|_| StoreError::Poisoned)?;
        if inner.products.values().any(|r| r.record.sku == product.sku) {
            return Err(StoreError::Duplicate {
                field: "sku",
                value: product.sku,
            });
        }
        if inner.products.contains_key(&product.id) {
            return Err(StoreError::Duplicate {
                field: "product id",
                value: product.id.to_string(),
            });
        }
        inner.products.insert(product.id, Row::new(product));
        Ok(())
    }

    /// Direct administrative edit. Pass `ExpectedVersion::Exact` to surface
    /// concurrent edits as conflicts.
    pub fn update_product(
        &self,
        by: &Principal,
        product: Product,
        expected: ExpectedVersion,
    ) -> Result<(), StoreError> {
        authorize(by.role, Resource::Products, Operation::Update)?;
        let mut inner = self.inner.write().map_err(|_| StoreError::Poisoned)?;
        if inner
            .products
            .values()
            .any(|r| r.record.id != product.id && r.record.sku == product.sku)
        {
            return Err(StoreError::Duplicate {
                field: "sku",
                value: product.sku,
            });
        }
        let row = inner
            .products
            .get_mut(&product.id)
            .ok_or_else(|| StoreError::NotFound(format!("product {}", product.id)))?;
        expected.check(row.version).map_err(StoreError::Domain)?;
        row.record = product;
        row.version += 1;
        Ok(())
    }

    /// Hard-blocked while any order line references the product.
    pub fn delete_product(&self, by: &Principal, id: ProductId) -> Result<(), StoreError> {
        authorize(by.role, Resource::Products, Operation::Delete)?;
        let mut inner = self.inner.write().map_err(|_| StoreError::Poisoned)?;
        if inner.product_referenced(id) {
            return Err(StoreError::Referenced(format!(
                "product {id} appears on existing order lines"
            )));
        }
        inner
            .products
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(format!("product {id}")))
    }

    pub fn insert_category(&self, by: &Principal, category: Category) -> Result<(), StoreError> {
        authorize(by.role, Resource::Categories, Operation::Insert)?;
        let mut inner = self.inner.write().map_err(|_| StoreError::Poisoned)?;
        if inner.categories.contains_key(&category.id) {
            return Err(StoreError::Duplicate {
                field: "category id",
                value: category.id.to_string(),
            });
        }
        inner.categories.insert(category.id, Row::new(category));
        Ok(())
    }

    /// Insert only: an existing id is a duplicate, never an overwrite. The
    /// update path (with its version check and stricter policy row) is the
    /// sole way to change an existing counterparty.
    pub fn insert_counterparty(
        &self,
        by: &Principal,
        counterparty: Counterparty,
    ) -> Result<(), StoreError> {
        authorize(by.role, counterparty_resource(counterparty.kind), Operation::Insert)?;
        let mut inner = self.inner.write().map_err(|_| StoreError::Poisoned)?;
        if inner.counterparties.contains_key(&counterparty.id) {
            return Err(StoreError::Duplicate {
                field: "counterparty id",
                value: counterparty.id.to_string(),
            });
        }
        inner
            .counterparties
            .insert(counterparty.id, Row::new(counterparty));
        Ok(())
    }

    /// Direct administrative edit of a counterparty (contact fields or a
    /// manual debt correction).
    pub fn update_counterparty(
        &self,
        by: &Principal,
        counterparty: Counterparty,
        expected: ExpectedVersion,
    ) -> Result<(), StoreError> {
        authorize(by.role, counterparty_resource(counterparty.kind), Operation::Update)?;
        let mut inner = self.inner.write().map_err(|_| StoreError::Poisoned)?;
        let row = inner
            .counterparties
            .get_mut(&counterparty.id)
            .ok_or_else(|| StoreError::NotFound(format!("counterparty {}", counterparty.id)))?;
        expected.check(row.version).map_err(StoreError::Domain)?;
        row.record = counterparty;
        row.version += 1;
        Ok(())
    }

    pub fn delete_counterparty(
        &self,
        by: &Principal,
        id: CounterpartyId,
    ) -> Result<(), StoreError> {
        let kind = {
            let inner = self.read()?;
            inner
                .counterparties
                .get(&id)
                .map(|r| r.record.kind)
                .ok_or_else(|| StoreError::NotFound(format!("counterparty {id}")))?
        };
        authorize(by.role, counterparty_resource(kind), Operation::Delete)?;
        let mut inner = self.inner.write().map_err(|_| StoreError::Poisoned)?;
        if inner.counterparty_referenced(id) {
            return Err(StoreError::Referenced(format!(
                "counterparty {id} appears on existing orders"
            )));
        }
        inner
            .counterparties
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(format!("counterparty {id}")))
    }

    // ── finance records ─────────────────────────────────────────────────

    pub fn record_payment(&self, by: &Principal, payment: Payment) -> Result<(), StoreError> {
        authorize(by.role, Resource::Payments, Operation::Insert)?;
        let mut inner = self.inner.write().map_err(|_| StoreError::Poisoned)?;
        if inner.payments.contains_key(&payment.id) {
            return Err(StoreError::Duplicate {
                field: "payment id",
                value: payment.id.to_string(),
            });
        }
        inner.payments.insert(payment.id, payment);
        Ok(())
    }

    pub fn record_cash_transaction(
        &self,
        by: &Principal,
        transaction: CashTransaction,
    ) -> Result<(), StoreError> {
        authorize(by.role, Resource::CashTransactions, Operation::Insert)?;
        let mut inner = self.inner.write().map_err(|_| StoreError::Poisoned)?;
        if inner.cash_transactions.contains_key(&transaction.id) {
            return Err(StoreError::Duplicate {
                field: "cash transaction id",
                value: transaction.id.to_string(),
            });
        }
        inner.cash_transactions.insert(transaction.id, transaction);
        Ok(())
    }

    // ── profiles ────────────────────────────────────────────────────────

    /// Profiles are the role source, so registration sits outside the policy
    /// matrix; whoever bootstraps the system seeds the first admin.
    pub fn insert_profile(&self, profile: Profile) -> Result<(), StoreError> {
        let mut inner = self.inner.write().map_err(|_| StoreError::Poisoned)?;
        if inner.profiles.values().any(|p| p.email == profile.email) {
            return Err(StoreError::Duplicate {
                field: "email",
                value: profile.email,
            });
        }
        if inner.profiles.contains_key(&profile.user_id) {
            return Err(StoreError::Duplicate {
                field: "user id",
                value: profile.user_id.to_string(),
            });
        }
        inner.profiles.insert(profile.user_id, profile);
        Ok(())
    }

    // ── orders ──────────────────────────────────────────────────────────

    /// Status flip only; settled stock and debt stay exactly as they are.
    pub fn cancel_order(&self, by: &Principal, id: OrderId) -> Result<(), StoreError> {
        let kind = {
            let inner = self.read()?;
            inner
                .orders
                .get(&id)
                .map(|r| r.record.kind)
                .ok_or_else(|| StoreError::NotFound(format!("order {id}")))?
        };
        authorize(by.role, order_resource(kind), Operation::Update)?;
        let mut inner = self.inner.write().map_err(|_| StoreError::Poisoned)?;
        let row = inner
            .orders
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(format!("order {id}")))?;
        row.record.cancel().map_err(StoreError::Domain)?;
        row.version += 1;
        Ok(())
    }

    // ── reads ───────────────────────────────────────────────────────────

    pub fn counterparty(&self, id: CounterpartyId) -> Result<Option<Counterparty>, StoreError> {
        Ok(self.read()?.counterparties.get(&id).map(|r| r.record.clone()))
    }

    pub fn order(&self, id: OrderId) -> Result<Option<Order>, StoreError> {
        Ok(self.read()?.orders.get(&id).map(|r| r.record.clone()))
    }

    pub fn profile(&self, user_id: UserId) -> Result<Option<Profile>, StoreError> {
        Ok(self.read()?.profiles.get(&user_id).cloned())
    }

    pub fn product_version(&self, id: ProductId) -> Result<Option<u64>, StoreError> {
        Ok(self.read()?.products.get(&id).map(|r| r.version))
    }

    /// Consistent point-in-time copy for ledger queries.
    pub fn snapshot(&self) -> Result<StoreSnapshot, StoreError> {
        let inner = self.read()?;
        Ok(StoreSnapshot {
            taken_at: Utc::now(),
            products: inner.products.values().map(|r| r.record.clone()).collect(),
            counterparties: inner
                .counterparties
                .values()
                .map(|r| r.record.clone())
                .collect(),
            orders: inner.orders.values().map(|r| r.record.clone()).collect(),
            payments: inner.payments.values().cloned().collect(),
            cash_transactions: inner.cash_transactions.values().cloned().collect(),
            profiles: inner.profiles.values().cloned().collect(),
        })
    }

    // ── transactions ────────────────────────────────────────────────────

    /// Run `f` against a working copy of the store; commit by swap on `Ok`,
    /// discard on `Err`. All-or-nothing, serialized by the write lock.
    pub fn transaction<T, E>(
        &self,
        f: impl FnOnce(&mut StoreTxn<'_>) -> Result<T, E>,
    ) -> Result<T, E>
    where
        E: From<StoreError>,
    {
        let mut guard = self
            .inner
            .write()
            .map_err(|_| E::from(StoreError::Poisoned))?;
        let mut working = guard.clone();
        let result = {
            let mut txn = StoreTxn {
                inner: &mut working,
            };
            f(&mut txn)
        };
        match result {
            Ok(value) => {
                *guard = working;
                debug!("store transaction committed");
                Ok(value)
            }
            Err(err) => {
                debug!("store transaction rolled back");
                Err(err)
            }
        }
    }
}

impl ProductReader for InMemoryStore {
    fn product(&self, id: ProductId) -> Option<Product> {
        self.inner
            .read()
            .ok()
            .and_then(|inner| inner.products.get(&id).map(|r| r.record.clone()))
    }
}

impl OrderNumberSource for InMemoryStore {
    fn next_order_number(&self, kind: OrderKind) -> DomainResult<OrderNumber> {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| DomainError::conflict("store lock poisoned"))?;
        let seq = match kind {
            OrderKind::Purchase => {
                inner.purchase_seq += 1;
                inner.purchase_seq
            }
            OrderKind::Sales => {
                inner.sales_seq += 1;
                inner.sales_seq
            }
        };
        Ok(OrderNumber::compose(kind, seq))
    }
}

/// Mutable view of the working copy inside a transaction.
///
/// Every mutation here is provisional until the enclosing closure returns
/// `Ok`; callers never observe a half-applied settlement.
pub struct StoreTxn<'a> {
    inner: &'a mut Inner,
}

impl StoreTxn<'_> {
    pub fn product(&self, id: ProductId) -> Option<Product> {
        self.inner.products.get(&id).map(|r| r.record.clone())
    }

    pub fn counterparty(&self, id: CounterpartyId) -> Option<Counterparty> {
        self.inner.counterparties.get(&id).map(|r| r.record.clone())
    }

    pub fn order(&self, id: OrderId) -> Option<Order> {
        self.inner.orders.get(&id).map(|r| r.record.clone())
    }

    /// Order id previously settled under this idempotency key, if any.
    pub fn settled_order_for(&self, key: IdempotencyKey) -> Option<OrderId> {
        self.inner.settlements.get(&key).copied()
    }

    /// Persist a new order (header + lines as one record). Order numbers and
    /// ids are unique across both order books.
    pub fn insert_order(&mut self, order: Order) -> Result<(), StoreError> {
        if self.inner.orders.contains_key(&order.id) {
            return Err(StoreError::Duplicate {
                field: "order id",
                value: order.id.to_string(),
            });
        }
        if !self.inner.order_numbers.insert(order.number.clone()) {
            return Err(StoreError::Duplicate {
                field: "order number",
                value: order.number.to_string(),
            });
        }
        self.inner.orders.insert(order.id, Row::new(order));
        Ok(())
    }

    /// Apply a signed stock delta; returns the resulting quantity.
    pub fn adjust_stock(&mut self, id: ProductId, delta: i64) -> Result<i64, StoreError> {
        let row = self
            .inner
            .products
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(format!("product {id}")))?;
        row.record
            .apply_stock_delta(delta, Utc::now())
            .map_err(StoreError::Domain)?;
        row.version += 1;
        Ok(row.record.stock_quantity)
    }

    /// Apply a signed debt delta; returns the resulting balance.
    pub fn adjust_debt(&mut self, id: CounterpartyId, delta: Money) -> Result<Money, StoreError> {
        let row = self
            .inner
            .counterparties
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(format!("counterparty {id}")))?;
        row.record.apply_debt_delta(delta).map_err(StoreError::Domain)?;
        row.version += 1;
        Ok(row.record.debt_balance)
    }

    /// Mark the idempotency key as settled by the given order.
    pub fn record_settlement(&mut self, key: IdempotencyKey, order_id: OrderId) {
        self.inner.settlements.insert(key, order_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use stockledger_auth::Role;
    use stockledger_orders::{OrderLine, OrderStatus};

    fn manager() -> Principal {
        Principal::new(UserId::new(), Role::Manager)
    }

    fn staff() -> Principal {
        Principal::new(UserId::new(), Role::Staff)
    }

    fn admin() -> Principal {
        Principal::new(UserId::new(), Role::Admin)
    }

    fn sample_product(sku: &str, stock: i64) -> Product {
        Product::new(
            ProductId::new(),
            sku,
            "Sample",
            None,
            "pcs",
            Money::from_major(5),
            Money::from_major(8),
            stock,
            2,
            Utc::now(),
        )
        .unwrap()
    }

    fn settled_order(kind: OrderKind, number: u64, product_id: ProductId) -> Order {
        let line = OrderLine::new(product_id, 1, Money::from_major(8)).unwrap();
        Order {
            id: OrderId::new(),
            number: OrderNumber::compose(kind, number),
            kind,
            counterparty_id: None,
            order_date: Utc::now(),
            total_amount: line.total_price,
            paid_amount: line.total_price,
            lines: vec![line],
            discount: Money::ZERO,
            status: OrderStatus::Completed,
            notes: None,
            created_by: UserId::new(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn duplicate_sku_is_rejected() {
        let store = InMemoryStore::new();
        store.insert_product(&manager(), sample_product("SKU-1", 5)).unwrap();
        let err = store
            .insert_product(&manager(), sample_product("SKU-1", 9))
            .unwrap_err();
        assert!(matches!(err, StoreError::Duplicate { field: "sku", .. }));
    }

    #[test]
    fn staff_supplier_insert_is_denied_and_writes_nothing() {
        let store = InMemoryStore::new();
        let supplier = Counterparty::new(
            CounterpartyId::new(),
            CounterpartyKind::Supplier,
            "Acme Supply",
            Utc::now(),
        )
        .unwrap();
        let id = supplier.id;

        let err = store.insert_counterparty(&staff(), supplier).unwrap_err();
        assert!(matches!(err, StoreError::Forbidden(_)));
        assert_eq!(store.counterparty(id).unwrap(), None);
    }

    #[test]
    fn reinserting_an_existing_counterparty_id_is_a_duplicate() {
        let store = InMemoryStore::new();
        let customer = Counterparty::new(
            CounterpartyId::new(),
            CounterpartyKind::Customer,
            "Indebted regular",
            Utc::now(),
        )
        .unwrap()
        .with_debt_balance(Money::from_major(500));
        let id = customer.id;
        store.insert_counterparty(&admin(), customer).unwrap();

        // Insert is open to staff for customers; it must never double as an
        // update that resets the stored balance.
        let zeroed = Counterparty::new(id, CounterpartyKind::Customer, "Imposter", Utc::now())
            .unwrap();
        let err = store.insert_counterparty(&staff(), zeroed).unwrap_err();
        assert!(matches!(err, StoreError::Duplicate { field: "counterparty id", .. }));

        let kept = store.counterparty(id).unwrap().unwrap();
        assert_eq!(kept.name, "Indebted regular");
        assert_eq!(kept.debt_balance, Money::from_major(500));
    }

    #[test]
    fn reinserting_an_existing_category_id_is_a_duplicate() {
        let store = InMemoryStore::new();
        let category =
            Category::new(CategoryId::new(), "Hardware", None, Utc::now()).unwrap();
        let id = category.id;
        store.insert_category(&manager(), category).unwrap();

        let replacement = Category::new(id, "Renamed", None, Utc::now()).unwrap();
        let err = store.insert_category(&manager(), replacement).unwrap_err();
        assert!(matches!(err, StoreError::Duplicate { field: "category id", .. }));
    }

    #[test]
    fn staff_customer_insert_is_allowed() {
        let store = InMemoryStore::new();
        let customer = Counterparty::new(
            CounterpartyId::new(),
            CounterpartyKind::Customer,
            "Walk-in regular",
            Utc::now(),
        )
        .unwrap();
        let id = customer.id;
        store.insert_counterparty(&staff(), customer).unwrap();
        assert!(store.counterparty(id).unwrap().is_some());
    }

    #[test]
    fn stale_version_update_is_a_conflict() {
        let store = InMemoryStore::new();
        let mut product = sample_product("SKU-9", 5);
        store.insert_product(&manager(), product.clone()).unwrap();

        product.name = "Renamed".to_string();
        store
            .update_product(&manager(), product.clone(), ExpectedVersion::Exact(1))
            .unwrap();

        // Second writer still believes version 1.
        let err = store
            .update_product(&manager(), product, ExpectedVersion::Exact(1))
            .unwrap_err();
        assert!(matches!(err, StoreError::Domain(DomainError::Conflict(_))));
    }

    #[test]
    fn stale_counterparty_update_is_a_conflict() {
        let store = InMemoryStore::new();
        let mut supplier = Counterparty::new(
            CounterpartyId::new(),
            CounterpartyKind::Supplier,
            "Acme Supply",
            Utc::now(),
        )
        .unwrap();
        store.insert_counterparty(&manager(), supplier.clone()).unwrap();

        supplier.phone = Some("555-0100".to_string());
        store
            .update_counterparty(&manager(), supplier.clone(), ExpectedVersion::Exact(1))
            .unwrap();

        // Second writer still believes version 1.
        let err = store
            .update_counterparty(&manager(), supplier.clone(), ExpectedVersion::Exact(1))
            .unwrap_err();
        assert!(matches!(err, StoreError::Domain(DomainError::Conflict(_))));

        let kept = store.counterparty(supplier.id).unwrap().unwrap();
        assert_eq!(kept.phone.as_deref(), Some("555-0100"));
    }

    #[test]
    fn referenced_counterparty_cannot_be_deleted() {
        let store = InMemoryStore::new();
        let product = sample_product("SKU-7", 10);
        let product_id = product.id;
        store.insert_product(&manager(), product).unwrap();

        let customer = Counterparty::new(
            CounterpartyId::new(),
            CounterpartyKind::Customer,
            "Repeat buyer",
            Utc::now(),
        )
        .unwrap();
        let customer_id = customer.id;
        store.insert_counterparty(&manager(), customer).unwrap();

        let mut order = settled_order(OrderKind::Sales, 1, product_id);
        order.counterparty_id = Some(customer_id);
        store.transaction(|txn| txn.insert_order(order)).unwrap();

        let err = store.delete_counterparty(&admin(), customer_id).unwrap_err();
        assert!(matches!(err, StoreError::Referenced(_)));
        assert!(store.counterparty(customer_id).unwrap().is_some());
    }

    #[test]
    fn unreferenced_counterparty_delete_is_admin_only() {
        let store = InMemoryStore::new();
        let supplier = Counterparty::new(
            CounterpartyId::new(),
            CounterpartyKind::Supplier,
            "One-off vendor",
            Utc::now(),
        )
        .unwrap();
        let id = supplier.id;
        store.insert_counterparty(&manager(), supplier).unwrap();

        let err = store.delete_counterparty(&manager(), id).unwrap_err();
        assert!(matches!(err, StoreError::Forbidden(_)));

        store.delete_counterparty(&admin(), id).unwrap();
        assert_eq!(store.counterparty(id).unwrap(), None);
    }

    #[test]
    fn product_version_drives_an_exact_checked_edit() {
        let store = InMemoryStore::new();
        let mut product = sample_product("SKU-8", 5);
        let id = product.id;
        store.insert_product(&manager(), product.clone()).unwrap();

        let version = store.product_version(id).unwrap().unwrap();
        product.min_stock_level = 4;
        store
            .update_product(&manager(), product, ExpectedVersion::Exact(version))
            .unwrap();

        assert_eq!(store.product_version(id).unwrap(), Some(version + 1));
        assert_eq!(store.product(id).unwrap().min_stock_level, 4);
    }

    #[test]
    fn failed_transaction_leaves_no_trace() {
        let store = InMemoryStore::new();
        let product = sample_product("SKU-2", 10);
        let product_id = product.id;
        store.insert_product(&manager(), product).unwrap();

        let order = settled_order(OrderKind::Sales, 1, product_id);
        let order_id = order.id;

        let result: Result<(), StoreError> = store.transaction(|txn| {
            txn.insert_order(order)?;
            txn.adjust_stock(product_id, -4)?;
            // Unknown counterparty: the whole transaction must unwind.
            txn.adjust_debt(CounterpartyId::new(), Money::from_major(1))?;
            Ok(())
        });

        assert!(matches!(result, Err(StoreError::NotFound(_))));
        assert_eq!(store.order(order_id).unwrap(), None);
        assert_eq!(store.product(product_id).unwrap().stock_quantity, 10);
    }

    #[test]
    fn committed_transaction_applies_every_step() {
        let store = InMemoryStore::new();
        let product = sample_product("SKU-3", 10);
        let product_id = product.id;
        store.insert_product(&manager(), product).unwrap();

        let order = settled_order(OrderKind::Sales, 1, product_id);
        let order_id = order.id;

        store
            .transaction(|txn| {
                txn.insert_order(order)?;
                txn.adjust_stock(product_id, -4)?;
                Ok::<_, StoreError>(())
            })
            .unwrap();

        assert!(store.order(order_id).unwrap().is_some());
        assert_eq!(store.product(product_id).unwrap().stock_quantity, 6);
    }

    #[test]
    fn order_numbers_are_monotonic_per_kind() {
        let store = InMemoryStore::new();
        let a = store.next_order_number(OrderKind::Purchase).unwrap();
        let b = store.next_order_number(OrderKind::Purchase).unwrap();
        let c = store.next_order_number(OrderKind::Sales).unwrap();
        assert_eq!(a.as_str(), "PO-000001");
        assert_eq!(b.as_str(), "PO-000002");
        assert_eq!(c.as_str(), "SO-000001");
    }

    #[test]
    fn duplicate_order_number_is_rejected_in_txn() {
        let store = InMemoryStore::new();
        let product = sample_product("SKU-4", 10);
        let product_id = product.id;
        store.insert_product(&manager(), product).unwrap();

        let first = settled_order(OrderKind::Sales, 7, product_id);
        let second = settled_order(OrderKind::Sales, 7, product_id);

        store
            .transaction(|txn| txn.insert_order(first))
            .unwrap();
        let err: StoreError = store
            .transaction(|txn| txn.insert_order(second))
            .unwrap_err();
        assert!(matches!(err, StoreError::Duplicate { field: "order number", .. }));
    }

    #[test]
    fn referenced_product_cannot_be_deleted() {
        let store = InMemoryStore::new();
        let product = sample_product("SKU-5", 10);
        let product_id = product.id;
        store.insert_product(&manager(), product).unwrap();
        store
            .transaction(|txn| txn.insert_order(settled_order(OrderKind::Sales, 1, product_id)))
            .unwrap();

        let err = store.delete_product(&admin(), product_id).unwrap_err();
        assert!(matches!(err, StoreError::Referenced(_)));
        assert!(store.product(product_id).is_some());
    }

    #[test]
    fn cancel_flips_status_and_nothing_else() {
        let store = InMemoryStore::new();
        let product = sample_product("SKU-6", 10);
        let product_id = product.id;
        store.insert_product(&manager(), product).unwrap();

        let order = settled_order(OrderKind::Sales, 1, product_id);
        let order_id = order.id;
        store
            .transaction(|txn| {
                txn.insert_order(order)?;
                txn.adjust_stock(product_id, -1)?;
                Ok::<_, StoreError>(())
            })
            .unwrap();

        store.cancel_order(&manager(), order_id).unwrap();
        let cancelled = store.order(order_id).unwrap().unwrap();
        assert_eq!(cancelled.status, OrderStatus::Cancelled);
        // Stock is NOT restored by cancellation.
        assert_eq!(store.product(product_id).unwrap().stock_quantity, 9);

        let err = store.cancel_order(&manager(), order_id).unwrap_err();
        assert!(matches!(err, StoreError::Domain(DomainError::Conflict(_))));
    }

    #[test]
    fn duplicate_profile_email_is_rejected() {
        let store = InMemoryStore::new();
        let a = Profile::new(UserId::new(), "x@example.com", "A", Role::Admin, Utc::now()).unwrap();
        let b = Profile::new(UserId::new(), "x@example.com", "B", Role::Staff, Utc::now()).unwrap();
        store.insert_profile(a).unwrap();
        let err = store.insert_profile(b).unwrap_err();
        assert!(matches!(err, StoreError::Duplicate { field: "email", .. }));
    }
}
