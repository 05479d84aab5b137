//! Per-store inventory analytics.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Quantity below which an in-stock product counts as low stock.
pub const LOW_STOCK_THRESHOLD: i32 = 10;

/// Aggregate figures over a store's active products.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreAnalytics {
    pub total_products: i64,
    /// Sum of `price * quantity`.
    pub total_value: Decimal,
    pub avg_product_price: Decimal,
    /// Products with `0 < quantity < LOW_STOCK_THRESHOLD`.
    pub low_stock_items: i64,
    /// Products with `quantity = 0`.
    pub out_of_stock_items: i64,
    /// Number of distinct categories.
    pub categories: i64,
    pub category_breakdown: Vec<CategoryBreakdown>,
}

/// Product count and inventory value for one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CategoryBreakdown {
    pub category: String,
    pub count: i64,
    pub total_value: Decimal,
}
