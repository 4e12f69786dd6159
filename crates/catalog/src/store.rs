//! The read interface the recommendation engine uses to reach the catalog.
//!
//! The engine treats the catalog as an external collaborator: every call
//! is async and may fail with `CatalogError::Unavailable`. `CatalogIndex`
//! is the in-process implementation.

use crate::error::Result;
use crate::types::{CatalogIndex, CatalogItem, FlavorProfile};
use async_trait::async_trait;
use rand::seq::IndexedRandom;
use tracing::debug;

/// Maximum number of items a single lookup returns
pub const QUERY_CAP: usize = 200;

/// Default flavor tolerance when the caller does not supply one
pub const DEFAULT_TOLERANCE: f32 = 1.0;

/// Read operations exposed by the catalog store.
///
/// `Send + Sync` so one store can be shared across request tasks.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Random sample of up to `n` items
    async fn sample_items(&self, n: usize) -> Result<Vec<CatalogItem>>;

    /// Items priced within `[min, max]`
    async fn items_by_price_range(&self, min: f64, max: f64) -> Result<Vec<CatalogItem>>;

    /// Items whose flavor profile is within `tolerance` of the target on every axis
    async fn items_by_flavor_profile(
        &self,
        body: f32,
        richness: f32,
        smoke: f32,
        sweetness: f32,
        tolerance: f32,
    ) -> Result<Vec<CatalogItem>>;

    /// Items whose origin contains `substring` (case-insensitive)
    async fn items_by_origin(&self, substring: &str) -> Result<Vec<CatalogItem>>;

    /// Items whose type contains `substring` (case-insensitive)
    async fn items_by_type(&self, substring: &str) -> Result<Vec<CatalogItem>>;

    /// The first `n` items of the catalog, used to resolve ids to full detail
    async fn limited_full_scan(&self, n: usize) -> Result<Vec<CatalogItem>>;

    /// A single item by id
    async fn item_by_id(&self, id: &str) -> Result<Option<CatalogItem>>;
}

#[async_trait]
impl CatalogStore for CatalogIndex {
    async fn sample_items(&self, n: usize) -> Result<Vec<CatalogItem>> {
        let sample: Vec<CatalogItem> = {
            let mut rng = rand::rng();
            self.items.choose_multiple(&mut rng, n).cloned().collect()
        };
        debug!("Sampled {} of {} catalog items", sample.len(), self.items.len());
        Ok(sample)
    }

    async fn items_by_price_range(&self, min: f64, max: f64) -> Result<Vec<CatalogItem>> {
        Ok(self.find_by_price_range(min, max, QUERY_CAP))
    }

    async fn items_by_flavor_profile(
        &self,
        body: f32,
        richness: f32,
        smoke: f32,
        sweetness: f32,
        tolerance: f32,
    ) -> Result<Vec<CatalogItem>> {
        let target = FlavorProfile::new(body, richness, smoke, sweetness);
        Ok(self.find_by_flavor(&target, tolerance.max(0.0), QUERY_CAP))
    }

    async fn items_by_origin(&self, substring: &str) -> Result<Vec<CatalogItem>> {
        Ok(self.find_by_origin(substring, QUERY_CAP))
    }

    async fn items_by_type(&self, substring: &str) -> Result<Vec<CatalogItem>> {
        Ok(self.find_by_type(substring, QUERY_CAP))
    }

    async fn limited_full_scan(&self, n: usize) -> Result<Vec<CatalogItem>> {
        Ok(self.items.iter().take(n).cloned().collect())
    }

    async fn item_by_id(&self, id: &str) -> Result<Option<CatalogItem>> {
        Ok(self.get(id).cloned())
    }
}
