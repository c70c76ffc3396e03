//! `stockledger-orders` — order domain types and the order composer.
//!
//! The composer turns loose line inputs into a fully validated, totalled
//! `OrderDraft`; nothing is written anywhere until the settlement engine
//! takes the draft through its transaction.

pub mod composer;
pub mod number;
pub mod order;

pub use composer::{DraftSpec, LineInput, OrderComposer, OrderDraft};
pub use number::{OrderNumber, OrderNumberSource};
pub use order::{Order, OrderId, OrderKind, OrderLine, OrderStatus};
