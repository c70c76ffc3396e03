//! Role set used for access decisions.

use serde::{Deserialize, Serialize};

/// Caller role. The set is closed: the policy matrix is defined over exactly
/// these three roles and nothing else.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Manager,
    Staff,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Admin, Role::Manager, Role::Staff];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Manager => "manager",
            Role::Staff => "staff",
        }
    }

    /// Admin or manager — the write tier for most tables.
    pub fn can_manage(&self) -> bool {
        matches!(self, Role::Admin | Role::Manager)
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
