//! Product route handlers.

use axum::extract::{Path, State};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::instrument;

use stockroom_core::{PageRequest, ProductId, StoreId};

use super::resource_id;
use crate::db::ProductRepository;
use crate::error::{AppError, Result};
use crate::extract::{ApiJson, ApiQuery};
use crate::models::{NewProduct, Product, ProductFilter, ProductPatch};
use crate::response::{ApiResponse, Deleted};
use crate::state::AppState;
use crate::validation::{
    self, MAX_CATEGORY_LEN, MAX_NAME_LEN, NumberInput, Validator, bounded, id_param, non_empty,
    page_request, price_bound, quantity_input,
};

const PRODUCT: &str = "Product";

/// Query string of `GET /products`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListProductsQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub category: Option<String>,
    pub store_id: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    pub search: Option<String>,
}

impl ListProductsQuery {
    /// Coerce every parameter and build the page window and filter.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` listing each invalid parameter.
    pub fn validate(self) -> Result<(PageRequest, ProductFilter)> {
        let mut v = Validator::new();

        let request = page_request(&mut v, self.page.as_deref(), self.limit.as_deref());
        let store_id = non_empty(self.store_id)
            .and_then(|raw| v.check("storeId", id_param::<StoreId>(&raw)));
        let min_price = non_empty(self.min_price)
            .and_then(|raw| v.check("minPrice", price_bound(&raw)));
        let max_price = non_empty(self.max_price)
            .and_then(|raw| v.check("maxPrice", price_bound(&raw)));

        let filter = ProductFilter {
            category: non_empty(self.category),
            store_id,
            min_price,
            max_price,
            search: non_empty(self.search),
        };

        v.finish(|| Some((request?, filter)))
    }
}

/// Body of `POST /products`.
///
/// `price` and `quantity` accept a JSON number or a numeric string.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    pub store_id: Option<String>,
    pub name: Option<String>,
    pub category: Option<String>,
    pub price: Option<Decimal>,
    pub quantity: Option<NumberInput>,
}

impl CreateProductRequest {
    /// Check every field and build the insert input. `quantity` defaults to 0.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` listing each invalid field.
    pub fn validate(self) -> Result<NewProduct> {
        let mut v = Validator::new();

        let store_id = v
            .required("storeId", self.store_id)
            .and_then(|raw| v.check("storeId", id_param::<StoreId>(&raw)));
        let name = v
            .required("name", self.name)
            .and_then(|name| v.check("name", bounded(name, MAX_NAME_LEN)));
        let category = v
            .required("category", self.category)
            .and_then(|category| v.check("category", bounded(category, MAX_CATEGORY_LEN)));
        let price = v
            .required("price", self.price)
            .and_then(|amount| v.check("price", validation::price(amount)));
        let quantity = v.check(
            "quantity",
            self.quantity.map_or(Ok(0), validation::quantity_input),
        );

        v.finish(|| {
            Some(NewProduct {
                store_id: store_id?,
                name: name?,
                category: category?,
                price: price?,
                quantity: quantity?,
            })
        })
    }
}

/// Body of `PATCH /products/{id}`. The owning store cannot be changed.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub category: Option<String>,
    pub price: Option<Decimal>,
    pub quantity: Option<NumberInput>,
}

impl UpdateProductRequest {
    /// Check the supplied fields and build the patch.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` for invalid fields and
    /// `AppError::BadRequest` when no field is supplied.
    pub fn validate(self) -> Result<ProductPatch> {
        let mut v = Validator::new();

        let name = self
            .name
            .and_then(|name| v.check("name", bounded(name, MAX_NAME_LEN)));
        let category = self
            .category
            .and_then(|category| v.check("category", bounded(category, MAX_CATEGORY_LEN)));
        let price = self
            .price
            .and_then(|amount| v.check("price", validation::price(amount)));
        let quantity = self
            .quantity
            .and_then(|value| v.check("quantity", validation::quantity_input(value)));

        let patch = v.finish(|| {
            Some(ProductPatch {
                name,
                category,
                price,
                quantity,
            })
        })?;
        if patch.is_empty() {
            return Err(AppError::BadRequest("No fields to update".to_string()));
        }
        Ok(patch)
    }
}

/// List active products matching the query filters.
///
/// GET /products
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ListProductsQuery>,
) -> Result<ApiResponse<Vec<Product>>> {
    let (request, filter) = query.validate()?;

    let page = ProductRepository::new(state.pool())
        .list(request, &filter)
        .await?;

    Ok(ApiResponse::page(page))
}

/// Create a product.
///
/// POST /products
#[instrument(skip(state, body))]
pub async fn create(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<CreateProductRequest>,
) -> Result<ApiResponse<Product>> {
    let input = body.validate()?;

    let product = ProductRepository::new(state.pool()).create(&input).await?;
    tracing::info!(product_id = %product.id, store_id = %product.store_id, "product created");

    Ok(ApiResponse::created(product))
}

/// Show an active product.
///
/// GET /products/{id}
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ApiResponse<Product>> {
    let id: ProductId = resource_id(&id, PRODUCT)?;

    let product = ProductRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or(AppError::NotFound(PRODUCT))?;

    Ok(ApiResponse::ok(product))
}

/// Update any of an active product's name, category, price and quantity.
///
/// PATCH /products/{id}
#[instrument(skip(state, body))]
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<UpdateProductRequest>,
) -> Result<ApiResponse<Product>> {
    let id: ProductId = resource_id(&id, PRODUCT)?;
    let patch = body.validate()?;

    let product = ProductRepository::new(state.pool())
        .update(id, &patch)
        .await?
        .ok_or(AppError::NotFound(PRODUCT))?;

    Ok(ApiResponse::ok(product))
}

/// Soft-delete an active product.
///
/// DELETE /products/{id}
#[instrument(skip(state))]
pub async fn destroy(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ApiResponse<Deleted<ProductId>>> {
    let id: ProductId = resource_id(&id, PRODUCT)?;

    if !ProductRepository::new(state.pool()).soft_delete(id).await? {
        return Err(AppError::NotFound(PRODUCT));
    }
    tracing::info!(product_id = %id, "product deleted");

    Ok(ApiResponse::ok(Deleted::new(id)))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn invalid_fields(err: AppError) -> Vec<String> {
        match err {
            AppError::Validation(details) => details.into_iter().map(|d| d.field).collect(),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    fn valid_create() -> CreateProductRequest {
        CreateProductRequest {
            store_id: Some("6f1c2a3e-0d4b-4c5e-9f70-8a9b0c1d2e3f".to_string()),
            name: Some("Wireless Headphones".to_string()),
            category: Some("Electronics".to_string()),
            price: Some(Decimal::new(7999, 2)),
            quantity: None,
        }
    }

    #[test]
    fn test_list_query_defaults() {
        let (request, filter) = ListProductsQuery::default().validate().unwrap();
        assert_eq!(request, PageRequest::default());
        assert_eq!(filter, ProductFilter::default());
    }

    #[test]
    fn test_list_query_coerces_filters() {
        let (_, filter) = ListProductsQuery {
            min_price: Some("50".to_string()),
            max_price: Some("150".to_string()),
            category: Some(String::new()),
            search: Some("Pro".to_string()),
            ..ListProductsQuery::default()
        }
        .validate()
        .unwrap();
        assert_eq!(filter.min_price, Some(Decimal::new(50, 0)));
        assert_eq!(filter.max_price, Some(Decimal::new(150, 0)));
        assert_eq!(filter.category, None);
        assert_eq!(filter.search.as_deref(), Some("Pro"));
    }

    #[test]
    fn test_list_query_reports_every_bad_parameter() {
        let err = ListProductsQuery {
            page: Some("0".to_string()),
            limit: Some("500".to_string()),
            store_id: Some("not-a-uuid".to_string()),
            min_price: Some("-1".to_string()),
            max_price: Some("abc".to_string()),
            ..ListProductsQuery::default()
        }
        .validate()
        .unwrap_err();
        assert_eq!(
            invalid_fields(err),
            ["page", "limit", "storeId", "minPrice", "maxPrice"]
        );
    }

    #[test]
    fn test_create_defaults_quantity_to_zero() {
        let input = valid_create().validate().unwrap();
        assert_eq!(input.quantity, 0);
        assert_eq!(input.price.to_string(), "79.99");
    }

    #[test]
    fn test_create_reports_missing_fields() {
        let err = CreateProductRequest::default().validate().unwrap_err();
        assert_eq!(invalid_fields(err), ["storeId", "name", "category", "price"]);
    }

    #[test]
    fn test_create_rejects_bad_values() {
        let err = CreateProductRequest {
            store_id: Some("nope".to_string()),
            category: Some("c".repeat(MAX_CATEGORY_LEN + 1)),
            price: Some(Decimal::ZERO),
            quantity: Some(NumberInput::Integer(-3)),
            ..valid_create()
        }
        .validate()
        .unwrap_err();
        assert_eq!(
            invalid_fields(err),
            ["storeId", "category", "price", "quantity"]
        );
    }

    #[test]
    fn test_create_rejects_sub_cent_prices() {
        let err = CreateProductRequest {
            price: Some(Decimal::new(19_999, 3)),
            ..valid_create()
        }
        .validate()
        .unwrap_err();
        assert_eq!(invalid_fields(err), ["price"]);
    }

    #[test]
    fn test_create_accepts_price_strings() {
        let body: CreateProductRequest = serde_json::from_value(serde_json::json!({
            "storeId": "6f1c2a3e-0d4b-4c5e-9f70-8a9b0c1d2e3f",
            "name": "Desk Lamp",
            "category": "Home",
            "price": "24.5",
            "quantity": 12
        }))
        .unwrap();
        let input = body.validate().unwrap();
        assert_eq!(input.price.to_string(), "24.50");
        assert_eq!(input.quantity, 12);
    }

    #[test]
    fn test_empty_update_is_bad_request() {
        let err = UpdateProductRequest::default().validate().unwrap_err();
        assert!(matches!(err, AppError::BadRequest(ref m) if m == "No fields to update"));
    }

    #[test]
    fn test_update_quantity_zero_is_a_change() {
        let patch = UpdateProductRequest {
            quantity: Some(NumberInput::Integer(0)),
            ..UpdateProductRequest::default()
        }
        .validate()
        .unwrap();
        assert_eq!(patch.quantity, Some(0));
    }

    #[test]
    fn test_list_query_accepts_bounds_beyond_stored_prices() {
        let (_, filter) = ListProductsQuery {
            min_price: Some("9.995".to_string()),
            max_price: Some("1000000000".to_string()),
            ..ListProductsQuery::default()
        }
        .validate()
        .unwrap();
        assert_eq!(filter.min_price, Some(Decimal::new(9995, 3)));
        assert_eq!(filter.max_price, Some(Decimal::new(1_000_000_000, 0)));
    }

    #[test]
    fn test_update_coerces_quantity_strings_and_whole_floats() {
        let patch: UpdateProductRequest =
            serde_json::from_value(serde_json::json!({"quantity": "12"})).unwrap();
        assert_eq!(patch.validate().unwrap().quantity, Some(12));

        let patch: UpdateProductRequest =
            serde_json::from_value(serde_json::json!({"quantity": 5.0})).unwrap();
        assert_eq!(patch.validate().unwrap().quantity, Some(5));
    }

    #[test]
    fn test_non_numeric_quantity_is_a_field_error() {
        let body: CreateProductRequest = serde_json::from_value(serde_json::json!({
            "storeId": "6f1c2a3e-0d4b-4c5e-9f70-8a9b0c1d2e3f",
            "name": "Desk Lamp",
            "category": "Home",
            "price": 24,
            "quantity": "a dozen"
        }))
        .unwrap();
        assert_eq!(invalid_fields(body.validate().unwrap_err()), ["quantity"]);
    }
}
