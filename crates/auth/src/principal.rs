//! The resolved actor for authorization decisions.

use serde::{Deserialize, Serialize};

use stockledger_core::UserId;

use crate::roles::Role;

/// A fully resolved caller.
///
/// Construction is decoupled from any authentication mechanism: whatever sits
/// in front of the core (session, token, CLI flag) resolves to a user id and
/// a role, and nothing downstream cares how.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub user_id: UserId,
    pub role: Role,
}

impl Principal {
    pub fn new(user_id: UserId, role: Role) -> Self {
        Self { user_id, role }
    }
}
