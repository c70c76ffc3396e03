//! `stockledger-ledger` — read-only reporting over store snapshots.
//!
//! Every aggregate is computed from one `StoreSnapshot`, so a query never
//! mixes pre- and post-settlement values. Queries tolerate concurrent
//! settlement; they simply see the state as of the snapshot.

pub mod summary;

pub use summary::{
    order_total, outstanding_debt, payment_total, recent_orders, summarize, LedgerSummary,
    RecentOrder,
};
