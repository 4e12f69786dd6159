//! # Catalog Crate
//!
//! The item catalog the recommendation engine reads from.
//!
//! ## Main Components
//!
//! - **types**: `CatalogItem`, `FlavorProfile` and the in-memory `CatalogIndex`
//! - **parser**: JSON catalog records -> `CatalogItem`
//! - **index**: loading, validation and synchronous lookups
//! - **store**: the async `CatalogStore` read interface
//! - **error**: error types for loading and querying
//!
//! ## Example Usage
//!
//! ```ignore
//! use catalog::{CatalogIndex, CatalogStore};
//! use std::path::Path;
//!
//! let index = CatalogIndex::load_from_file(Path::new("data/catalog.json"))?;
//! let smoky = index.items_by_flavor_profile(3.0, 4.0, 5.0, 2.0, 1.0).await?;
//! ```

pub mod error;
pub mod types;
pub mod parser;
pub mod index;
pub mod store;

pub use error::{CatalogError, Result};
pub use store::{CatalogStore, DEFAULT_TOLERANCE, QUERY_CAP};
pub use types::{CatalogIndex, CatalogItem, FlavorProfile, ItemId, MAX_FLAVOR_SCORE, UNKNOWN};
