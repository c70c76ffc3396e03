//! Product category.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockledger_core::{DomainError, DomainResult, RecordId};

/// Category identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryId(pub RecordId);

impl CategoryId {
    pub fn new() -> Self {
        Self(RecordId::new())
    }
}

impl Default for CategoryId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for CategoryId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Category {
    pub fn new(
        id: CategoryId,
        name: impl Into<String>,
        description: Option<String>,
        created_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("category name must not be empty"));
        }
        Ok(Self {
            id,
            name,
            description,
            created_at,
        })
    }
}
