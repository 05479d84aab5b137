//! Core types for Stockroom.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod pagination;
pub mod price;

pub use id::*;
pub use pagination::{Page, PageRequest, PageRequestError, Pagination};
pub use price::{Price, PriceError};
