//! Product repository: filtered listing, lookup and mutations.

use sqlx::PgPool;
use tracing::instrument;

use stockroom_core::{Page, PageRequest, Pagination, ProductId};

use super::scope::{ActiveQuery, contains_pattern};
use super::{RepositoryError, count_to_total};
use crate::models::{NewProduct, Product, ProductFilter, ProductPatch};

/// Columns selected for a full [`Product`] row.
pub(crate) const PRODUCT_COLUMNS: &str =
    "id, store_id, name, category, price, quantity, created_at, updated_at, deleted_at";

/// Listing order. Rows come back in insertion order.
const PRODUCT_ORDER: &str = " ORDER BY created_at, id";

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List active products matching `filter`, one page at a time.
    ///
    /// The page query and the count query run concurrently.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if either query fails.
    #[instrument(skip(self))]
    pub async fn list(
        &self,
        request: PageRequest,
        filter: &ProductFilter,
    ) -> Result<Page<Product>, RepositoryError> {
        let mut rows = filtered(&format!("SELECT {PRODUCT_COLUMNS} FROM products"), filter);
        rows.push(PRODUCT_ORDER)
            .paginate(i64::from(request.limit()), request.offset());
        let mut rows = rows.into_builder();

        let mut count = filtered("SELECT COUNT(*) FROM products", filter).into_builder();

        let (items, total) = tokio::try_join!(
            rows.build_query_as::<Product>().fetch_all(self.pool),
            count.build_query_scalar::<i64>().fetch_one(self.pool),
        )?;

        Ok(Page {
            items,
            pagination: Pagination::new(request, count_to_total(total)?),
        })
    }

    /// Get an active product by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let mut query = ActiveQuery::new(&format!("SELECT {PRODUCT_COLUMNS} FROM products"));
        query.and_eq("id", id);

        let product = query
            .into_builder()
            .build_query_as::<Product>()
            .fetch_optional(self.pool)
            .await?;

        Ok(product)
    }

    /// Create a new product under an active store.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the store does not exist or was
    /// soft-deleted.
    /// Returns `RepositoryError::Database` for other database errors.
    #[instrument(skip(self), fields(store_id = %input.store_id))]
    pub async fn create(&self, input: &NewProduct) -> Result<Product, RepositoryError> {
        let missing_store = || format!("store {} does not exist", input.store_id);

        let product = insert_into_active_store(input)
            .into_builder()
            .build_query_as::<Product>()
            .fetch_optional(self.pool)
            .await
            .map_err(|e| RepositoryError::from_write(e, &missing_store()))?;

        product.ok_or_else(|| RepositoryError::Conflict(missing_store()))
    }

    /// Merge `patch` into an active product and refresh `updated_at`.
    ///
    /// Returns `None` if no active product has this ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn update(
        &self,
        id: ProductId,
        patch: &ProductPatch,
    ) -> Result<Option<Product>, RepositoryError> {
        let mut query = ActiveQuery::with_head(|set| {
            set.push("UPDATE products SET updated_at = NOW()");
            if let Some(name) = &patch.name {
                set.push(", name = ").push_bind(name.clone());
            }
            if let Some(category) = &patch.category {
                set.push(", category = ").push_bind(category.clone());
            }
            if let Some(price) = patch.price {
                set.push(", price = ").push_bind(price);
            }
            if let Some(quantity) = patch.quantity {
                set.push(", quantity = ").push_bind(quantity);
            }
        });
        query
            .and_eq("id", id)
            .push(" RETURNING ")
            .push(PRODUCT_COLUMNS);

        let product = query
            .into_builder()
            .build_query_as::<Product>()
            .fetch_optional(self.pool)
            .await?;

        Ok(product)
    }

    /// Soft-delete an active product.
    ///
    /// Returns `false` if the product does not exist or was already deleted.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn soft_delete(&self, id: ProductId) -> Result<bool, RepositoryError> {
        let mut query =
            ActiveQuery::new("UPDATE products SET deleted_at = NOW(), updated_at = NOW()");
        query.and_eq("id", id).push(" RETURNING id");

        let deleted = query
            .into_builder()
            .build_query_scalar::<ProductId>()
            .fetch_optional(self.pool)
            .await?;

        Ok(deleted.is_some())
    }
}

/// `INSERT ... SELECT` that only yields a row while the owning store is active.
fn insert_into_active_store(input: &NewProduct) -> ActiveQuery<'static> {
    let mut query = ActiveQuery::with_head(|insert| {
        insert
            .push("INSERT INTO products (store_id, name, category, price, quantity) SELECT id, ")
            .push_bind(input.name.clone())
            .push(", ")
            .push_bind(input.category.clone())
            .push(", ")
            .push_bind(input.price)
            .push(", ")
            .push_bind(input.quantity)
            .push(" FROM stores");
    });
    query
        .and_eq("id", input.store_id)
        .push(" RETURNING ")
        .push(PRODUCT_COLUMNS);
    query
}

/// Start an active-scope query over products with every filter criterion applied.
fn filtered(head: &str, filter: &ProductFilter) -> ActiveQuery<'static> {
    let mut query = ActiveQuery::new(head);

    if let Some(category) = &filter.category {
        query.and_eq("category", category.clone());
    }
    if let Some(store_id) = filter.store_id {
        query.and_eq("store_id", store_id);
    }
    if let Some(min_price) = filter.min_price {
        query.and_cmp("price", ">=", min_price);
    }
    if let Some(max_price) = filter.max_price {
        query.and_cmp("price", "<=", max_price);
    }
    if let Some(search) = &filter.search {
        query.and_cmp("name", "LIKE", contains_pattern(search));
    }

    query
}
