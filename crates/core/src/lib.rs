//! `stockledger-core` — shared domain primitives.
//!
//! Error taxonomy, strongly-typed identifiers, fixed-point money, and the
//! optimistic-concurrency building blocks used by the store. No IO here.

pub mod concurrency;
pub mod error;
pub mod id;
pub mod money;

pub use concurrency::ExpectedVersion;
pub use error::{DomainError, DomainResult};
pub use id::{IdempotencyKey, RecordId, UserId};
pub use money::Money;
