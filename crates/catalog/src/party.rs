//! Counterparties: customers and suppliers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockledger_core::{DomainError, DomainResult, Money, RecordId};

/// Counterparty identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CounterpartyId(pub RecordId);

impl CounterpartyId {
    pub fn new() -> Self {
        Self(RecordId::new())
    }
}

impl Default for CounterpartyId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for CounterpartyId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Which side of the business the counterparty sits on.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CounterpartyKind {
    Customer,
    Supplier,
}

impl CounterpartyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CounterpartyKind::Customer => "customer",
            CounterpartyKind::Supplier => "supplier",
        }
    }
}

impl core::fmt::Display for CounterpartyKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A customer or supplier with a running debt balance.
///
/// Sign convention: positive means money is owed to the business by a
/// customer, or owed by the business to a supplier. Only the settlement
/// engine and direct administrative edits may move the balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counterparty {
    pub id: CounterpartyId,
    pub kind: CounterpartyKind,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub debt_balance: Money,
    pub created_at: DateTime<Utc>,
}

impl Counterparty {
    pub fn new(
        id: CounterpartyId,
        kind: CounterpartyKind,
        name: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("counterparty name must not be empty"));
        }
        Ok(Self {
            id,
            kind,
            name,
            phone: None,
            email: None,
            address: None,
            debt_balance: Money::ZERO,
            created_at,
        })
    }

    pub fn with_debt_balance(mut self, debt_balance: Money) -> Self {
        self.debt_balance = debt_balance;
        self
    }

    pub fn with_contact(
        mut self,
        phone: Option<String>,
        email: Option<String>,
        address: Option<String>,
    ) -> Self {
        self.phone = phone;
        self.email = email;
        self.address = address;
        self
    }

    /// Move the balance by a signed delta (checked).
    pub fn apply_debt_delta(&mut self, delta: Money) -> DomainResult<()> {
        self.debt_balance = self.debt_balance.checked_add(delta)?;
        Ok(())
    }
}
