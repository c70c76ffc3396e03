//! Independent income/expense records.
//!
//! Payments and cash transactions feed the ledger queries but are not
//! causally required for order settlement; they reference orders by id only.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockledger_core::{DomainError, DomainResult, Money, RecordId, UserId};

/// Payment identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaymentId(pub RecordId);

impl PaymentId {
    pub fn new() -> Self {
        Self(RecordId::new())
    }
}

impl Default for PaymentId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for PaymentId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Cash transaction identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CashTransactionId(pub RecordId);

impl CashTransactionId {
    pub fn new() -> Self {
        Self(RecordId::new())
    }
}

impl Default for CashTransactionId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for CashTransactionId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Which order book a payment belongs to.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentType {
    Purchase,
    Sale,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    BankTransfer,
    Card,
}

/// A recorded payment against an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub id: PaymentId,
    pub payment_type: PaymentType,
    pub reference_id: RecordId,
    pub amount: Money,
    pub method: PaymentMethod,
    pub payment_date: DateTime<Utc>,
    pub notes: Option<String>,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
}

impl Payment {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: PaymentId,
        payment_type: PaymentType,
        reference_id: RecordId,
        amount: Money,
        method: PaymentMethod,
        payment_date: DateTime<Utc>,
        created_by: UserId,
        created_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        if amount.is_negative() || amount.is_zero() {
            return Err(DomainError::validation("payment amount must be positive"));
        }
        Ok(Self {
            id,
            payment_type,
            reference_id,
            amount,
            method,
            payment_date,
            notes: None,
            created_by,
            created_at,
        })
    }
}

/// Direction of a cash transaction.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CashFlow {
    Income,
    Expense,
}

/// Free-standing income/expense entry (rent, utilities, cash sales, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashTransaction {
    pub id: CashTransactionId,
    pub flow: CashFlow,
    pub category: String,
    pub amount: Money,
    pub description: Option<String>,
    pub transaction_date: DateTime<Utc>,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
}

impl CashTransaction {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: CashTransactionId,
        flow: CashFlow,
        category: impl Into<String>,
        amount: Money,
        transaction_date: DateTime<Utc>,
        created_by: UserId,
        created_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let category = category.into();
        if category.trim().is_empty() {
            return Err(DomainError::validation("transaction category must not be empty"));
        }
        if amount.is_negative() || amount.is_zero() {
            return Err(DomainError::validation("transaction amount must be positive"));
        }
        Ok(Self {
            id,
            flow,
            category,
            amount,
            description: None,
            transaction_date,
            created_by,
            created_at,
        })
    }
}
