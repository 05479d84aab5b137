//! Store route handlers.

use axum::extract::{Path, State};
use serde::Deserialize;
use tracing::instrument;

use stockroom_core::StoreId;

use super::{PageQuery, resource_id};
use crate::db::StoreRepository;
use crate::error::{AppError, Result};
use crate::extract::{ApiJson, ApiQuery};
use crate::models::{NewStore, Product, Store, StoreAnalytics, StorePatch};
use crate::response::{ApiResponse, Deleted};
use crate::state::AppState;
use crate::validation::{MAX_NAME_LEN, Validator, bounded, non_empty, page_request};

const STORE: &str = "Store";

/// Body of `POST /stores`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateStoreRequest {
    pub name: Option<String>,
    pub location: Option<String>,
}

impl CreateStoreRequest {
    /// Check every field and build the insert input.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` listing each invalid field.
    pub fn validate(self) -> Result<NewStore> {
        let mut v = Validator::new();

        let name = v
            .required("name", self.name)
            .and_then(|name| v.check("name", bounded(name, MAX_NAME_LEN)));
        let location = v
            .required("location", self.location)
            .and_then(|location| v.check("location", bounded(location, MAX_NAME_LEN)));

        v.finish(|| {
            Some(NewStore {
                name: name?,
                location: location?,
            })
        })
    }
}

/// Body of `PATCH /stores/{id}`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStoreRequest {
    pub name: Option<String>,
    pub location: Option<String>,
}

impl UpdateStoreRequest {
    /// Check the supplied fields and build the patch.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` for invalid fields and
    /// `AppError::BadRequest` when no field is supplied.
    pub fn validate(self) -> Result<StorePatch> {
        let mut v = Validator::new();

        let name = self
            .name
            .and_then(|name| v.check("name", bounded(name, MAX_NAME_LEN)));
        let location = self
            .location
            .and_then(|location| v.check("location", bounded(location, MAX_NAME_LEN)));

        let patch = v.finish(|| Some(StorePatch { name, location }))?;
        if patch.is_empty() {
            return Err(AppError::BadRequest("No fields to update".to_string()));
        }
        Ok(patch)
    }
}

/// Query string of `GET /stores/{id}/products`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreProductsQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub category: Option<String>,
}

/// List active stores.
///
/// GET /stores
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> Result<ApiResponse<Vec<Store>>> {
    let request = query.validate()?;

    let page = StoreRepository::new(state.pool()).list(request).await?;

    Ok(ApiResponse::page(page))
}

/// Create a store.
///
/// POST /stores
#[instrument(skip(state, body))]
pub async fn create(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<CreateStoreRequest>,
) -> Result<ApiResponse<Store>> {
    let input = body.validate()?;

    let store = StoreRepository::new(state.pool()).create(&input).await?;
    tracing::info!(store_id = %store.id, "store created");

    Ok(ApiResponse::created(store))
}

/// Show an active store.
///
/// GET /stores/{id}
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ApiResponse<Store>> {
    let id: StoreId = resource_id(&id, STORE)?;

    let store = StoreRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or(AppError::NotFound(STORE))?;

    Ok(ApiResponse::ok(store))
}

/// Update an active store's name and/or location.
///
/// PATCH /stores/{id}
#[instrument(skip(state, body))]
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<UpdateStoreRequest>,
) -> Result<ApiResponse<Store>> {
    let id: StoreId = resource_id(&id, STORE)?;
    let patch = body.validate()?;

    let store = StoreRepository::new(state.pool())
        .update(id, &patch)
        .await?
        .ok_or(AppError::NotFound(STORE))?;

    Ok(ApiResponse::ok(store))
}

/// Soft-delete an active store.
///
/// DELETE /stores/{id}
#[instrument(skip(state))]
pub async fn destroy(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ApiResponse<Deleted<StoreId>>> {
    let id: StoreId = resource_id(&id, STORE)?;

    if !StoreRepository::new(state.pool()).soft_delete(id).await? {
        return Err(AppError::NotFound(STORE));
    }
    tracing::info!(store_id = %id, "store deleted");

    Ok(ApiResponse::ok(Deleted::new(id)))
}

/// List an active store's products.
///
/// GET /stores/{id}/products
#[instrument(skip(state))]
pub async fn products(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiQuery(query): ApiQuery<StoreProductsQuery>,
) -> Result<ApiResponse<Vec<Product>>> {
    let mut v = Validator::new();
    let request = page_request(&mut v, query.page.as_deref(), query.limit.as_deref());
    let request = v.finish(|| request)?;

    let id: StoreId = resource_id(&id, STORE)?;
    let stores = StoreRepository::new(state.pool());
    if !stores.exists(id).await? {
        return Err(AppError::NotFound(STORE));
    }

    let page = stores
        .products(id, request, non_empty(query.category))
        .await?;

    Ok(ApiResponse::page(page))
}

/// Inventory analytics for an active store.
///
/// GET /stores/{id}/analytics
#[instrument(skip(state))]
pub async fn analytics(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ApiResponse<StoreAnalytics>> {
    let id: StoreId = resource_id(&id, STORE)?;
    let stores = StoreRepository::new(state.pool());
    if !stores.exists(id).await? {
        return Err(AppError::NotFound(STORE));
    }

    let analytics = stores.analytics(id).await?;

    Ok(ApiResponse::ok(analytics))
}
