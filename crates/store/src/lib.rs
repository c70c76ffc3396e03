//! `stockledger-store` — the concrete Catalog Store collaborator.
//!
//! An in-memory, row-versioned store with a single-writer transaction
//! closure. The store is the sole arbiter of atomicity: everything a
//! settlement writes (header, lines, stock, debt, idempotency record) goes
//! through one transaction and either all of it lands or none of it does.
//!
//! Intended for tests/dev and as the reference semantics for a SQL-backed
//! implementation. Not optimized for large datasets.

pub mod error;
pub mod memory;
pub mod snapshot;

pub use error::StoreError;
pub use memory::{InMemoryStore, StoreTxn};
pub use snapshot::StoreSnapshot;
