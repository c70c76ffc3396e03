//! `stockledger-catalog` — master records: products, categories,
//! counterparties, and the independent payment/cash-flow records.
//!
//! Pure data + validation. The store crate owns persistence; the settlement
//! engine is the only component that mutates stock and debt balances outside
//! direct administrative edits.

pub mod category;
pub mod finance;
pub mod party;
pub mod product;

pub use category::{Category, CategoryId};
pub use finance::{
    CashFlow, CashTransaction, CashTransactionId, Payment, PaymentId, PaymentMethod, PaymentType,
};
pub use party::{Counterparty, CounterpartyId, CounterpartyKind};
pub use product::{Product, ProductId, ProductReader};
