//! Point-in-time read view.

use chrono::{DateTime, Utc};

use stockledger_auth::Profile;
use stockledger_catalog::{CashTransaction, Counterparty, Payment, Product};
use stockledger_orders::Order;

/// A consistent copy of the store taken under one read lock.
///
/// Ledger queries aggregate over a snapshot so no individual aggregate mixes
/// pre- and post-settlement values. Snapshots do not track later mutation.
#[derive(Debug, Clone)]
pub struct StoreSnapshot {
    pub taken_at: DateTime<Utc>,
    pub products: Vec<Product>,
    pub counterparties: Vec<Counterparty>,
    pub orders: Vec<Order>,
    pub payments: Vec<Payment>,
    pub cash_transactions: Vec<CashTransaction>,
    pub profiles: Vec<Profile>,
}
