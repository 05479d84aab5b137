//! Request validation.
//!
//! Handlers read query parameters as raw strings and JSON bodies into loosely
//! typed request structs, then run them through a [`Validator`]. Every invalid
//! field is collected before the request is rejected, so a client sees all of
//! its mistakes at once.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};

use stockroom_core::{PageRequest, PageRequestError, Price};

use crate::error::AppError;

/// Longest accepted store name, store location or product name.
pub const MAX_NAME_LEN: usize = 255;
/// Longest accepted product category.
pub const MAX_CATEGORY_LEN: usize = 100;

const NOT_AN_INTEGER: &str = "must be an integer";

/// One invalid input field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Collects field errors while a request is checked.
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<FieldError>,
}

impl Validator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error against `field`.
    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        self.errors.push(FieldError::new(field, message));
    }

    /// Keep the value of a successful check, record the message of a failed one.
    pub fn check<T>(&mut self, field: &str, result: Result<T, String>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(message) => {
                self.push(field, message);
                None
            }
        }
    }

    /// Require a field that may be missing from the request.
    pub fn required<T>(&mut self, field: &str, value: Option<T>) -> Option<T> {
        if value.is_none() {
            self.push(field, "is required");
        }
        value
    }

    /// Whether every check so far passed.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Finish validation, turning collected errors into an [`AppError`].
    ///
    /// `build` runs only when no errors were recorded; it returns `None` if a
    /// checked value was missing, which can only happen alongside an error.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` listing every recorded field error.
    pub fn finish<T>(self, build: impl FnOnce() -> Option<T>) -> Result<T, AppError> {
        if !self.errors.is_empty() {
            return Err(AppError::Validation(self.errors));
        }
        build().ok_or_else(|| AppError::Internal("validated value missing".to_string()))
    }
}

/// Check that a string holds `1..=max` characters.
///
/// # Errors
///
/// Returns a message naming the violated bound.
pub fn bounded(value: String, max: usize) -> Result<String, String> {
    let len = value.chars().count();
    if len == 0 {
        Err("must not be empty".to_string())
    } else if len > max {
        Err(format!("must be at most {max} characters"))
    } else {
        Ok(value)
    }
}

/// Check that a quantity is a non-negative integer that fits the column.
///
/// # Errors
///
/// Returns a message when the quantity is negative or too large.
pub fn quantity(value: i64) -> Result<i32, String> {
    if value < 0 {
        return Err("must be greater than or equal to 0".to_string());
    }
    i32::try_from(value).map_err(|_| format!("must be at most {}", i32::MAX))
}

/// A JSON number or numeric string, as clients send them.
///
/// Anything else still deserializes (as `Other`) so the validator can report
/// it against its field.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum NumberInput {
    Integer(i64),
    Float(f64),
    Text(String),
    Other(IgnoredAny),
}

/// Coerce a number or numeric string into a quantity.
///
/// `12`, `"12"` and `12.0` are accepted; fractions and non-numbers are not.
///
/// # Errors
///
/// Returns a message when the input is not a whole number or is out of range.
pub fn quantity_input(input: NumberInput) -> Result<i32, String> {
    let value = match input {
        NumberInput::Integer(value) => value,
        NumberInput::Float(value) => whole(&value.to_string())?,
        NumberInput::Text(raw) => whole(&raw)?,
        NumberInput::Other(_) => return Err(NOT_AN_INTEGER.to_string()),
    };
    quantity(value)
}

fn whole(raw: &str) -> Result<i64, String> {
    Decimal::from_str(raw.trim())
        .ok()
        .filter(|value| value.fract().is_zero())
        .and_then(|value| i64::try_from(value).ok())
        .ok_or_else(|| NOT_AN_INTEGER.to_string())
}

/// Convert a decoded decimal into a [`Price`].
///
/// # Errors
///
/// Returns the [`PriceError`](stockroom_core::PriceError) message.
pub fn price(value: Decimal) -> Result<Price, String> {
    Price::new(value).map_err(|e| e.to_string())
}

/// Coerce a `minPrice`/`maxPrice` query string into a bound.
///
/// Bounds only need to be positive; they are compared against stored prices
/// and may be finer or larger than any price.
///
/// # Errors
///
/// Returns a message when the string is not a positive decimal.
pub fn price_bound(raw: &str) -> Result<Decimal, String> {
    match Decimal::from_str(raw.trim()) {
        Ok(bound) if bound > Decimal::ZERO => Ok(bound),
        _ => Err("must be a positive number".to_string()),
    }
}

/// Coerce a query string into an id type.
///
/// # Errors
///
/// Returns a message when the string is not a UUID.
pub fn id_param<T: FromStr>(raw: &str) -> Result<T, String> {
    raw.trim()
        .parse::<T>()
        .map_err(|_| "must be a valid UUID".to_string())
}

/// Treat an empty query value as absent.
#[must_use]
pub fn non_empty(raw: Option<String>) -> Option<String> {
    raw.filter(|value| !value.is_empty())
}

/// Validate `page` and `limit` query parameters, applying defaults.
pub fn page_request(
    v: &mut Validator,
    page: Option<&str>,
    limit: Option<&str>,
) -> Option<PageRequest> {
    let page = v.check(
        "page",
        coerce_u32(page, PageRequest::DEFAULT_PAGE).and_then(|page| {
            if page < 1 {
                Err(PageRequestError::PageTooSmall.to_string())
            } else {
                Ok(page)
            }
        }),
    );
    let limit = v.check(
        "limit",
        coerce_u32(limit, PageRequest::DEFAULT_LIMIT).and_then(|limit| {
            if (1..=PageRequest::MAX_LIMIT).contains(&limit) {
                Ok(limit)
            } else {
                Err(PageRequestError::LimitOutOfRange.to_string())
            }
        }),
    );

    PageRequest::new(page?, limit?).ok()
}

fn coerce_u32(raw: Option<&str>, default: u32) -> Result<u32, String> {
    match raw.map(str::trim) {
        None => Ok(default),
        Some(raw) => raw
            .parse::<u32>()
            .map_err(|_| "must be a positive integer".to_string()),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn fields(err: AppError) -> Vec<String> {
        match err {
            AppError::Validation(details) => details.into_iter().map(|d| d.field).collect(),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_page_request_defaults() {
        let mut v = Validator::new();
        let request = page_request(&mut v, None, None).unwrap();
        assert!(v.is_valid());
        assert_eq!(request, PageRequest::default());
    }

    #[test]
    fn test_page_request_coerces_strings() {
        let mut v = Validator::new();
        let request = page_request(&mut v, Some("3"), Some("25")).unwrap();
        assert_eq!((request.page(), request.limit()), (3, 25));
        assert_eq!(request.offset(), 50);
    }

    #[test]
    fn test_page_request_reports_both_fields() {
        let mut v = Validator::new();
        assert!(page_request(&mut v, Some("0"), Some("101")).is_none());
        let err = v.finish(|| Some(())).unwrap_err();
        assert_eq!(fields(err), ["page", "limit"]);
    }

    #[test]
    fn test_page_request_rejects_non_numbers() {
        let mut v = Validator::new();
        assert!(page_request(&mut v, Some("abc"), None).is_none());
        assert!(!v.is_valid());
    }

    #[test]
    fn test_bounded_lengths() {
        assert!(bounded(String::new(), 10).is_err());
        assert!(bounded("x".repeat(11), 10).is_err());
        assert_eq!(bounded("Main St".to_string(), 10).unwrap(), "Main St");
    }

    #[test]
    fn test_bounded_counts_characters() {
        assert!(bounded("é".repeat(MAX_CATEGORY_LEN), MAX_CATEGORY_LEN).is_ok());
    }

    #[test]
    fn test_quantity_bounds() {
        assert_eq!(quantity(0).unwrap(), 0);
        assert!(quantity(-1).is_err());
        assert!(quantity(i64::from(i32::MAX) + 1).is_err());
    }

    #[test]
    fn test_price_bound() {
        assert_eq!(price_bound("50").unwrap(), Decimal::new(50, 0));
        assert_eq!(price_bound(" 9.995 ").unwrap(), Decimal::new(9995, 3));
        assert_eq!(
            price_bound("1000000000").unwrap(),
            Decimal::new(1_000_000_000, 0)
        );
        assert!(price_bound("0").is_err());
        assert!(price_bound("-5").is_err());
        assert!(price_bound("cheap").is_err());
    }

    fn number(json: &str) -> NumberInput {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_quantity_input_coerces_whole_numbers() {
        assert_eq!(quantity_input(number("12")).unwrap(), 12);
        assert_eq!(quantity_input(number("\"12\"")).unwrap(), 12);
        assert_eq!(quantity_input(number("5.0")).unwrap(), 5);
        assert_eq!(quantity_input(number("\" 7 \"")).unwrap(), 7);
    }

    #[test]
    fn test_quantity_input_rejects_other_values() {
        assert_eq!(quantity_input(number("2.5")).unwrap_err(), NOT_AN_INTEGER);
        assert_eq!(quantity_input(number("\"lots\"")).unwrap_err(), NOT_AN_INTEGER);
        assert_eq!(quantity_input(number("true")).unwrap_err(), NOT_AN_INTEGER);
        assert_eq!(quantity_input(number("[1]")).unwrap_err(), NOT_AN_INTEGER);
        assert!(quantity_input(number("\"-4\"")).is_err());
        assert!(quantity_input(number("1e12")).is_err());
    }

    #[test]
    fn test_required_and_finish() {
        let mut v = Validator::new();
        assert!(v.required::<String>("name", None).is_none());
        assert_eq!(v.required("location", Some(1)), Some(1));
        assert_eq!(fields(v.finish(|| Some(())).unwrap_err()), ["name"]);
    }

    #[test]
    fn test_non_empty() {
        assert_eq!(non_empty(Some(String::new())), None);
        assert_eq!(non_empty(Some("Books".into())).as_deref(), Some("Books"));
    }
}
