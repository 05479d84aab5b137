//! Uniform JSON response envelope.
//!
//! Every endpoint answers with
//! `{success, data?, error?: {message, code, details?}, meta?: {pagination?}}`.
//! Clients branch on `success`; the HTTP status stays REST-conventional.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use stockroom_core::{Page, Pagination};

use crate::validation::FieldError;

/// Response envelope.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    #[serde(skip)]
    status: StatusCode,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
}

/// Error details carried by a failed response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub message: String,
    pub code: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<FieldError>>,
}

/// Metadata carried alongside list data.
#[derive(Debug, Serialize)]
pub struct Meta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
}

/// Confirmation body returned by delete endpoints.
#[derive(Debug, Serialize)]
pub struct Deleted<I> {
    pub id: I,
    pub deleted: bool,
}

impl<I> Deleted<I> {
    pub const fn new(id: I) -> Self {
        Self { id, deleted: true }
    }
}

impl<T> ApiResponse<T> {
    /// 200 with `data`.
    pub const fn ok(data: T) -> Self {
        Self {
            status: StatusCode::OK,
            success: true,
            data: Some(data),
            error: None,
            meta: None,
        }
    }

    /// 201 with the created resource.
    pub fn created(data: T) -> Self {
        Self {
            status: StatusCode::CREATED,
            ..Self::ok(data)
        }
    }

    /// HTTP status the envelope is sent with.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }
}

impl<T> ApiResponse<Vec<T>> {
    /// 200 with a page of items and its pagination metadata.
    pub fn page(page: Page<T>) -> Self {
        Self {
            meta: Some(Meta {
                pagination: Some(page.pagination),
            }),
            ..Self::ok(page.items)
        }
    }
}

impl ApiResponse<()> {
    /// A failed response.
    #[must_use]
    pub const fn failure(status: StatusCode, error: ErrorBody) -> Self {
        Self {
            status,
            success: false,
            data: None,
            error: Some(error),
            meta: None,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use stockroom_core::PageRequest;

    #[test]
    fn test_ok_envelope_omits_error_and_meta() {
        let json = serde_json::to_value(ApiResponse::ok("hello")).unwrap();
        assert_eq!(json, serde_json::json!({"success": true, "data": "hello"}));
    }

    #[test]
    fn test_created_status() {
        assert_eq!(ApiResponse::created(1).status(), StatusCode::CREATED);
    }

    #[test]
    fn test_page_envelope_carries_pagination() {
        let page = Page {
            items: vec![1, 2],
            pagination: Pagination::new(PageRequest::new(1, 2).unwrap(), 5),
        };
        let json = serde_json::to_value(ApiResponse::page(page)).unwrap();
        assert_eq!(json["data"], serde_json::json!([1, 2]));
        assert_eq!(
            json["meta"]["pagination"],
            serde_json::json!({"page": 1, "limit": 2, "total": 5, "totalPages": 3})
        );
    }

    #[test]
    fn test_failure_envelope() {
        let response = ApiResponse::failure(
            StatusCode::NOT_FOUND,
            ErrorBody {
                message: "Store not found".to_string(),
                code: "NOT_FOUND",
                details: None,
            },
        );
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "success": false,
                "error": {"message": "Store not found", "code": "NOT_FOUND"}
            })
        );
    }

    #[test]
    fn test_deleted_body() {
        let json = serde_json::to_value(Deleted::new("abc")).unwrap();
        assert_eq!(json, serde_json::json!({"id": "abc", "deleted": true}));
    }
}
