//! The access policy matrix and its evaluation function.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::roles::Role;

/// A protected table-level resource.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    Products,
    Categories,
    Suppliers,
    Customers,
    PurchaseOrders,
    SalesOrders,
    Payments,
    CashTransactions,
}

impl Resource {
    pub const ALL: [Resource; 8] = [
        Resource::Products,
        Resource::Categories,
        Resource::Suppliers,
        Resource::Customers,
        Resource::PurchaseOrders,
        Resource::SalesOrders,
        Resource::Payments,
        Resource::CashTransactions,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Resource::Products => "products",
            Resource::Categories => "categories",
            Resource::Suppliers => "suppliers",
            Resource::Customers => "customers",
            Resource::PurchaseOrders => "purchase_orders",
            Resource::SalesOrders => "sales_orders",
            Resource::Payments => "payments",
            Resource::CashTransactions => "cash_transactions",
        }
    }

    /// Customer-facing tables accept inserts from any authenticated role so
    /// staff can record walk-in sales without a manager present.
    fn open_insert(&self) -> bool {
        matches!(self, Resource::Customers | Resource::SalesOrders)
    }
}

impl core::fmt::Display for Resource {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Table operation kind.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Read,
    Insert,
    Update,
    Delete,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Read => "read",
            Operation::Insert => "insert",
            Operation::Update => "update",
            Operation::Delete => "delete",
        }
    }
}

impl core::fmt::Display for Operation {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("forbidden: role '{role}' may not {operation} {resource}")]
    Forbidden {
        role: Role,
        resource: Resource,
        operation: Operation,
    },
}

/// Evaluate the policy matrix.
///
/// - Reads are open to every authenticated role.
/// - Inserts require admin/manager, except customers and sales orders which
///   accept any role.
/// - Updates require admin/manager everywhere.
/// - Deletes are admin-only everywhere.
///
/// Deny is a normal `Err`, not a panic; callers decide whether to surface it
/// or pick another path.
pub fn authorize(role: Role, resource: Resource, operation: Operation) -> Result<(), AuthzError> {
    let permitted = match operation {
        Operation::Read => true,
        Operation::Insert => resource.open_insert() || role.can_manage(),
        Operation::Update => role.can_manage(),
        Operation::Delete => role == Role::Admin,
    };

    if permitted {
        Ok(())
    } else {
        Err(AuthzError::Forbidden {
            role,
            resource,
            operation,
        })
    }
}
