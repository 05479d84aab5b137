//! Domain models for the inventory database.

pub mod analytics;
pub mod product;
pub mod store;

pub use analytics::{CategoryBreakdown, StoreAnalytics};
pub use product::{NewProduct, Product, ProductFilter, ProductPatch};
pub use store::{NewStore, Store, StorePatch};
