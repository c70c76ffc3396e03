//! `stockledger-settlement` — the settlement engine.
//!
//! Settling an order durably records the header and lines, moves stock per
//! line, and moves the counterparty's debt balance by the unpaid remainder —
//! all inside one store transaction, so a failure at any step applies
//! nothing. Settlement is at-most-once per client-supplied idempotency key.

pub mod engine;
pub mod error;

pub use engine::{SettledOrder, SettlementEngine};
pub use error::{SettlementError, SettlementStep};
