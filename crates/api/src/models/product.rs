//! Product domain models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use stockroom_core::{Price, ProductId, StoreId};

/// A product held in a store's inventory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Unique product ID.
    pub id: ProductId,
    /// Store that owns the product.
    pub store_id: StoreId,
    /// Display name.
    pub name: String,
    /// Free-form category label.
    pub category: String,
    /// Unit price, serialized as a decimal string.
    pub price: Price,
    /// Units on hand.
    pub quantity: i32,
    /// When the product was created.
    pub created_at: DateTime<Utc>,
    /// When the product was last updated.
    pub updated_at: DateTime<Utc>,
    /// When the product was soft-deleted, if it was.
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Input for creating a new product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    pub store_id: StoreId,
    pub name: String,
    pub category: String,
    pub price: Price,
    pub quantity: i32,
}

/// Partial update for a product; only present fields are changed.
///
/// The owning store cannot be changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub category: Option<String>,
    pub price: Option<Price>,
    pub quantity: Option<i32>,
}

impl ProductPatch {
    /// Whether the patch would change nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.category.is_none()
            && self.price.is_none()
            && self.quantity.is_none()
    }
}

/// Filter criteria for listing products. All present criteria must match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilter {
    /// Exact category match.
    pub category: Option<String>,
    /// Exact owning store match.
    pub store_id: Option<StoreId>,
    /// Inclusive lower price bound.
    pub min_price: Option<Decimal>,
    /// Inclusive upper price bound.
    pub max_price: Option<Decimal>,
    /// Case-sensitive substring of the product name.
    pub search: Option<String>,
}

impl ProductFilter {
    /// Filter scoped to one store, optionally narrowed to a category.
    #[must_use]
    pub fn for_store(store_id: StoreId, category: Option<String>) -> Self {
        Self {
            store_id: Some(store_id),
            category,
            ..Self::default()
        }
    }
}
