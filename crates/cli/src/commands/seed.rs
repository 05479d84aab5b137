//! Seed the database with demo inventory.
//!
//! This command reads stores and their products from a YAML file, wipes both
//! tables and inserts the dataset in a single transaction.
//!
//! # File Format
//!
//! ```yaml
//! stores:
//!   - name: "Downtown Electronics"
//!     location: "123 Main St, City Center"
//!     products:
//!       - { name: "iPhone 15 Pro", category: "Smartphones", price: "999.99", quantity: 25 }
//! ```

use std::path::Path;

use serde::Deserialize;
use sqlx::PgPool;
use tracing::{error, info};

use stockroom_api::validation::{MAX_CATEGORY_LEN, MAX_NAME_LEN, bounded};
use stockroom_core::{Price, StoreId};

use super::{CommandError, connect};

/// Root of a seed file.
#[derive(Debug, Deserialize)]
pub struct SeedFile {
    pub stores: Vec<SeedStore>,
}

/// A store and the products it owns.
#[derive(Debug, Deserialize)]
pub struct SeedStore {
    pub name: String,
    pub location: String,
    #[serde(default)]
    pub products: Vec<SeedProduct>,
}

/// A product to insert for its enclosing store.
#[derive(Debug, Deserialize)]
pub struct SeedProduct {
    pub name: String,
    pub category: String,
    pub price: Price,
    #[serde(default)]
    pub quantity: i32,
}

/// Counts reported after seeding.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub stores: usize,
    pub products: usize,
}

impl SeedFile {
    /// Number of products across every store.
    #[must_use]
    pub fn product_count(&self) -> usize {
        self.stores.iter().map(|store| store.products.len()).sum()
    }
}

/// Check every entry against the limits the API enforces.
///
/// Returns one message per problem; an empty list means the file is valid.
#[must_use]
pub fn validate(seed: &SeedFile) -> Vec<String> {
    let mut errors = Vec::new();

    for (i, store) in seed.stores.iter().enumerate() {
        let at = format!("stores[{i}]");
        check_len(&mut errors, &format!("{at}.name"), &store.name, MAX_NAME_LEN);
        check_len(&mut errors, &format!("{at}.location"), &store.location, MAX_NAME_LEN);

        for (j, product) in store.products.iter().enumerate() {
            let at = format!("{at}.products[{j}]");
            check_len(&mut errors, &format!("{at}.name"), &product.name, MAX_NAME_LEN);
            check_len(
                &mut errors,
                &format!("{at}.category"),
                &product.category,
                MAX_CATEGORY_LEN,
            );
            if product.quantity < 0 {
                errors.push(format!("{at}.quantity: must be greater than or equal to 0"));
            }
        }
    }

    errors
}

fn check_len(errors: &mut Vec<String>, path: &str, value: &str, max: usize) {
    if let Err(message) = bounded(value.to_owned(), max) {
        errors.push(format!("{path}: {message}"));
    }
}

/// Seed demo inventory from a YAML file, replacing all existing rows.
///
/// # Errors
///
/// Returns `CommandError` if the file cannot be read or is invalid, the
/// database URL is missing, or any statement fails (nothing is committed then).
pub async fn run(file_path: &Path) -> Result<SeedSummary, CommandError> {
    info!(path = %file_path.display(), "Loading seed data from file");

    // Read and validate YAML before connecting to database
    let content = tokio::fs::read_to_string(file_path)
        .await
        .map_err(|source| CommandError::Io {
            path: file_path.display().to_string(),
            source,
        })?;
    let seed: SeedFile = serde_yaml::from_str(&content)?;

    let errors = validate(&seed);
    if !errors.is_empty() {
        error!("Seed validation failed:");
        for err in &errors {
            error!("  - {err}");
        }
        return Err(CommandError::InvalidSeed(format!(
            "{} validation errors found",
            errors.len()
        )));
    }
    info!(
        stores = seed.stores.len(),
        products = seed.product_count(),
        "Seed data validated"
    );

    let pool = connect().await?;
    let summary = load(&pool, &seed).await?;

    info!(
        stores = summary.stores,
        products = summary.products,
        "Seeding completed successfully"
    );
    Ok(summary)
}

/// Wipe both tables and insert `seed` atomically.
async fn load(pool: &PgPool, seed: &SeedFile) -> Result<SeedSummary, CommandError> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM products").execute(&mut *tx).await?;
    sqlx::query("DELETE FROM stores").execute(&mut *tx).await?;

    let mut summary = SeedSummary::default();
    for store in &seed.stores {
        let store_id: StoreId =
            sqlx::query_scalar("INSERT INTO stores (name, location) VALUES ($1, $2) RETURNING id")
                .bind(&store.name)
                .bind(&store.location)
                .fetch_one(&mut *tx)
                .await?;
        summary.stores += 1;

        for product in &store.products {
            sqlx::query(
                "INSERT INTO products (store_id, name, category, price, quantity) \
                 VALUES ($1, $2, $3, $4, $5)",
            )
            .bind(store_id)
            .bind(&product.name)
            .bind(&product.category)
            .bind(product.price)
            .bind(product.quantity)
            .execute(&mut *tx)
            .await?;
            summary.products += 1;
        }
    }

    tx.commit().await?;
    Ok(summary)
}
