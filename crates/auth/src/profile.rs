//! User profile record — the role source for principals.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockledger_core::{DomainError, DomainResult, UserId};

use crate::{Principal, Role};

/// A registered user: unique email, display name, role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub user_id: UserId,
    pub email: String,
    pub full_name: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl Profile {
    pub fn new(
        user_id: UserId,
        email: impl Into<String>,
        full_name: impl Into<String>,
        role: Role,
        created_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let email = email.into();
        let full_name = full_name.into();

        if email.trim().is_empty() || !email.contains('@') {
            return Err(DomainError::validation("email must be a plausible address"));
        }
        if full_name.trim().is_empty() {
            return Err(DomainError::validation("full_name must not be empty"));
        }

        Ok(Self {
            user_id,
            email,
            full_name,
            role,
            created_at,
        })
    }

    pub fn principal(&self) -> Principal {
        Principal::new(self.user_id, self.role)
    }
}
