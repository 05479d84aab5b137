//! HTTP route handlers for the inventory API.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                  - Liveness probe
//! GET    /health/ready            - Readiness probe (checks the database)
//!
//! # Stores
//! GET    /stores                  - Paginated store list
//! POST   /stores                  - Create store
//! GET    /stores/{id}             - Store detail
//! PATCH  /stores/{id}             - Partial store update
//! DELETE /stores/{id}             - Soft-delete store
//! GET    /stores/{id}/products    - Store's products (page, limit, category)
//! GET    /stores/{id}/analytics   - Inventory analytics
//!
//! # Products
//! GET    /products                - Filtered product list
//! POST   /products                - Create product
//! GET    /products/{id}           - Product detail
//! PATCH  /products/{id}           - Partial product update
//! DELETE /products/{id}           - Soft-delete product
//! ```
//!
//! Unknown paths answer with a `NOT_FOUND` envelope.

pub mod health;
pub mod products;
pub mod stores;

use std::str::FromStr;

use axum::{Router, routing::get};
use serde::Deserialize;

use stockroom_core::PageRequest;

use crate::error::{AppError, Result};
use crate::state::AppState;
use crate::validation::{Validator, page_request};

/// `page`/`limit` query string shared by plain list endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
}

impl PageQuery {
    /// Coerce `page` and `limit`, applying defaults.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` listing each invalid parameter.
    pub fn validate(self) -> Result<PageRequest> {
        let mut v = Validator::new();
        let request = page_request(&mut v, self.page.as_deref(), self.limit.as_deref());
        v.finish(|| request)
    }
}

/// Parse a path id. An id that is not a UUID cannot address anything, so it
/// is reported as a missing `resource`.
pub(crate) fn resource_id<T: FromStr>(raw: &str, resource: &'static str) -> Result<T> {
    raw.parse().map_err(|_| AppError::NotFound(resource))
}

/// Create the store routes router.
pub fn store_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(stores::index).post(stores::create))
        .route(
            "/{id}",
            get(stores::show)
                .patch(stores::update)
                .delete(stores::destroy),
        )
        .route("/{id}/products", get(stores::products))
        .route("/{id}/analytics", get(stores::analytics))
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index).post(products::create))
        .route(
            "/{id}",
            get(products::show)
                .patch(products::update)
                .delete(products::destroy),
        )
}

/// Create all routes for the API.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest("/stores", store_routes())
        .nest("/products", product_routes())
        .fallback(not_found)
}

/// Fallback for paths no route matches.
async fn not_found() -> AppError {
    AppError::NotFound("Route")
}
