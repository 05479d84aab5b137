//! Store domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockroom_core::StoreId;

/// A physical store that owns products.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Store {
    /// Unique store ID.
    pub id: StoreId,
    /// Display name.
    pub name: String,
    /// Free-form address or location description.
    pub location: String,
    /// When the store was created.
    pub created_at: DateTime<Utc>,
    /// When the store was last updated.
    pub updated_at: DateTime<Utc>,
    /// When the store was soft-deleted, if it was.
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Input for creating a new store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStore {
    pub name: String,
    pub location: String,
}

/// Partial update for a store; only present fields are changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StorePatch {
    pub name: Option<String>,
    pub location: Option<String>,
}

impl StorePatch {
    /// Whether the patch would change nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none() && self.location.is_none()
    }
}
