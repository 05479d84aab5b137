//! Store repository: listing, lookup, mutations and analytics.

use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::instrument;

use stockroom_core::{Page, PageRequest, Pagination, StoreId};

use super::products::ProductRepository;
use super::scope::ActiveQuery;
use super::{RepositoryError, count_to_total};
use crate::models::analytics::LOW_STOCK_THRESHOLD;
use crate::models::{
    CategoryBreakdown, NewStore, Product, ProductFilter, Store, StoreAnalytics, StorePatch,
};

/// Columns selected for a full [`Store`] row.
const STORE_COLUMNS: &str = "id, name, location, created_at, updated_at, deleted_at";

/// Scale monetary aggregates are reported with.
const MONEY_SCALE: u32 = 2;

/// Internal row type for the analytics summary query.
#[derive(Debug, sqlx::FromRow)]
struct SummaryRow {
    total_products: i64,
    total_value: Decimal,
    avg_product_price: Decimal,
    low_stock_items: i64,
    out_of_stock_items: i64,
    categories: i64,
}

/// Repository for store database operations.
pub struct StoreRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> StoreRepository<'a> {
    /// Create a new store repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List active stores, one page at a time.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if either query fails.
    #[instrument(skip(self))]
    pub async fn list(&self, request: PageRequest) -> Result<Page<Store>, RepositoryError> {
        let mut rows = ActiveQuery::new(&format!("SELECT {STORE_COLUMNS} FROM stores"));
        rows.push(" ORDER BY created_at, id")
            .paginate(i64::from(request.limit()), request.offset());
        let mut rows = rows.into_builder();

        let mut count = ActiveQuery::new("SELECT COUNT(*) FROM stores").into_builder();

        let (items, total) = tokio::try_join!(
            rows.build_query_as::<Store>().fetch_all(self.pool),
            count.build_query_scalar::<i64>().fetch_one(self.pool),
        )?;

        Ok(Page {
            items,
            pagination: Pagination::new(request, count_to_total(total)?),
        })
    }

    /// Get an active store by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn get(&self, id: StoreId) -> Result<Option<Store>, RepositoryError> {
        let mut query = ActiveQuery::new(&format!("SELECT {STORE_COLUMNS} FROM stores"));
        query.and_eq("id", id);

        let store = query
            .into_builder()
            .build_query_as::<Store>()
            .fetch_optional(self.pool)
            .await?;

        Ok(store)
    }

    /// Whether an active store with this ID exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn exists(&self, id: StoreId) -> Result<bool, RepositoryError> {
        let mut query = ActiveQuery::new("SELECT id FROM stores");
        query.and_eq("id", id);

        let found = query
            .into_builder()
            .build_query_scalar::<StoreId>()
            .fetch_optional(self.pool)
            .await?;

        Ok(found.is_some())
    }

    /// Create a new store.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn create(&self, input: &NewStore) -> Result<Store, RepositoryError> {
        let sql = format!(
            "INSERT INTO stores (name, location) VALUES ($1, $2) RETURNING {STORE_COLUMNS}"
        );

        let store = sqlx::query_as::<_, Store>(&sql)
            .bind(&input.name)
            .bind(&input.location)
            .fetch_one(self.pool)
            .await
            .map_err(|e| RepositoryError::from_write(e, "store already exists"))?;

        Ok(store)
    }

    /// Merge `patch` into an active store and refresh `updated_at`.
    ///
    /// Returns `None` if no active store has this ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn update(
        &self,
        id: StoreId,
        patch: &StorePatch,
    ) -> Result<Option<Store>, RepositoryError> {
        let mut query = ActiveQuery::with_head(|set| {
            set.push("UPDATE stores SET updated_at = NOW()");
            if let Some(name) = &patch.name {
                set.push(", name = ").push_bind(name.clone());
            }
            if let Some(location) = &patch.location {
                set.push(", location = ").push_bind(location.clone());
            }
        });
        query
            .and_eq("id", id)
            .push(" RETURNING ")
            .push(STORE_COLUMNS);

        let store = query
            .into_builder()
            .build_query_as::<Store>()
            .fetch_optional(self.pool)
            .await?;

        Ok(store)
    }

    /// Soft-delete an active store. Its products keep their own state.
    ///
    /// Returns `false` if the store does not exist or was already deleted.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn soft_delete(&self, id: StoreId) -> Result<bool, RepositoryError> {
        let mut query =
            ActiveQuery::new("UPDATE stores SET deleted_at = NOW(), updated_at = NOW()");
        query.and_eq("id", id).push(" RETURNING id");

        let deleted = query
            .into_builder()
            .build_query_scalar::<StoreId>()
            .fetch_optional(self.pool)
            .await?;

        Ok(deleted.is_some())
    }

    /// List a store's active products, optionally narrowed to one category.
    ///
    /// Callers check that the store exists first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if either query fails.
    pub async fn products(
        &self,
        id: StoreId,
        request: PageRequest,
        category: Option<String>,
    ) -> Result<Page<Product>, RepositoryError> {
        ProductRepository::new(self.pool)
            .list(request, &ProductFilter::for_store(id, category))
            .await
    }

    /// Aggregate inventory figures over a store's active products.
    ///
    /// The summary and the per-category breakdown run concurrently. A store
    /// without active products reports zeros and an empty breakdown.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if either query fails.
    #[instrument(skip(self))]
    pub async fn analytics(&self, id: StoreId) -> Result<StoreAnalytics, RepositoryError> {
        let mut summary = ActiveQuery::new(&format!(
            "SELECT COUNT(*) AS total_products, \
             COALESCE(SUM(price * quantity), 0) AS total_value, \
             ROUND(COALESCE(AVG(price), 0), {MONEY_SCALE}) AS avg_product_price, \
             COUNT(*) FILTER (WHERE quantity > 0 AND quantity < {LOW_STOCK_THRESHOLD}) AS low_stock_items, \
             COUNT(*) FILTER (WHERE quantity = 0) AS out_of_stock_items, \
             COUNT(DISTINCT category) AS categories \
             FROM products"
        ));
        summary.and_eq("store_id", id);
        let mut summary = summary.into_builder();

        let mut breakdown = ActiveQuery::new(
            "SELECT category, COUNT(*) AS count, \
             COALESCE(SUM(price * quantity), 0) AS total_value \
             FROM products",
        );
        breakdown
            .and_eq("store_id", id)
            .push(" GROUP BY category ORDER BY total_value DESC, category ASC");
        let mut breakdown = breakdown.into_builder();

        let (summary, breakdown) = tokio::try_join!(
            summary.build_query_as::<SummaryRow>().fetch_one(self.pool),
            breakdown
                .build_query_as::<CategoryBreakdown>()
                .fetch_all(self.pool),
        )?;

        Ok(StoreAnalytics {
            total_products: summary.total_products,
            total_value: money(summary.total_value),
            avg_product_price: money(summary.avg_product_price),
            low_stock_items: summary.low_stock_items,
            out_of_stock_items: summary.out_of_stock_items,
            categories: summary.categories,
            category_breakdown: breakdown
                .into_iter()
                .map(|row| CategoryBreakdown {
                    total_value: money(row.total_value),
                    ..row
                })
                .collect(),
        })
    }
}

/// Normalize a monetary aggregate to two decimal places.
fn money(amount: Decimal) -> Decimal {
    let mut amount = amount.round_dp(MONEY_SCALE);
    amount.rescale(MONEY_SCALE);
    amount
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_pads_zero_and_integers() {
        assert_eq!(money(Decimal::ZERO).to_string(), "0.00");
        assert_eq!(money(Decimal::from(2250)).to_string(), "2250.00");
    }

    #[test]
    fn test_money_rounds_long_averages() {
        let avg = Decimal::new(583_333_333, 7); // 58.3333333
        assert_eq!(money(avg).to_string(), "58.33");
    }
}
