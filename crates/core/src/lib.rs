//! Stockroom Core - Shared domain types.
//!
//! This crate provides the types shared by the Stockroom components:
//! - `api` - The inventory REST API server
//! - `cli` - Command-line tools for migrations and seeding
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access,
//! no HTTP handling. Enable the `postgres` feature to get `sqlx`
//! encode/decode implementations for the id and price types.
//!
//! # Modules
//!
//! - [`types`] - Typed ids, monetary prices and pagination windows

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
