//! Core domain types for the item catalog.
//!
//! A `CatalogItem` is an immutable snapshot owned by the catalog store.
//! The recommendation engine only ever reads these; every query returns
//! fresh clones.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// =============================================================================
// Type Aliases & Constants
// =============================================================================

/// Unique identifier for a catalog item (e.g. "W17")
pub type ItemId = String;

/// Placeholder used when an item has no recorded origin or type
pub const UNKNOWN: &str = "unknown";

/// Upper bound of every flavor axis
pub const MAX_FLAVOR_SCORE: f32 = 5.0;

// =============================================================================
// Flavor Profile
// =============================================================================

/// Four bounded taste scores, each in `[0, 5]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FlavorProfile {
    pub body: f32,
    pub richness: f32,
    pub smoke: f32,
    pub sweetness: f32,
}

impl FlavorProfile {
    /// Build a profile, clamping every axis into `[0, 5]`.
    pub fn new(body: f32, richness: f32, smoke: f32, sweetness: f32) -> Self {
        Self {
            body: clamp_score(body),
            richness: clamp_score(richness),
            smoke: clamp_score(smoke),
            sweetness: clamp_score(sweetness),
        }
    }

    /// True when every axis is within `tolerance` of the target.
    pub fn within(&self, target: &FlavorProfile, tolerance: f32) -> bool {
        let axis = |value: f32, wanted: f32| {
            let low = (wanted - tolerance).max(0.0);
            let high = (wanted + tolerance).min(MAX_FLAVOR_SCORE);
            value >= low && value <= high
        };
        axis(self.body, target.body)
            && axis(self.richness, target.richness)
            && axis(self.smoke, target.smoke)
            && axis(self.sweetness, target.sweetness)
    }
}

fn clamp_score(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, MAX_FLAVOR_SCORE)
    }
}

// =============================================================================
// Catalog Item
// =============================================================================

/// One item in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: ItemId,
    pub name: String,
    /// Non-negative price in the catalog's currency unit (KRW in the bundled data)
    pub price: f64,
    /// Age statement in years, if the item carries one
    pub age: Option<u32>,
    pub origin: String,
    #[serde(rename = "type")]
    pub item_type: String,
    pub flavor: FlavorProfile,
    /// Image reference, relative to the asset root
    pub image: Option<String>,
}

impl CatalogItem {
    /// Create an item with unknown origin/type and a flat flavor profile.
    pub fn new(id: impl Into<ItemId>, name: impl Into<String>, price: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price: price.max(0.0),
            age: None,
            origin: UNKNOWN.to_string(),
            item_type: UNKNOWN.to_string(),
            flavor: FlavorProfile::default(),
            image: None,
        }
    }

    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = origin.into();
        self
    }

    pub fn with_type(mut self, item_type: impl Into<String>) -> Self {
        self.item_type = item_type.into();
        self
    }

    pub fn with_age(mut self, age: u32) -> Self {
        self.age = Some(age);
        self
    }

    pub fn with_flavor(mut self, flavor: FlavorProfile) -> Self {
        self.flavor = flavor;
        self
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }
}

// =============================================================================
// CatalogIndex - In-Memory Catalog
// =============================================================================

/// In-memory catalog with an id index and an origin index.
///
/// Items keep their load order in `items`; the maps store positions into it.
#[derive(Debug, Default)]
pub struct CatalogIndex {
    pub(crate) items: Vec<CatalogItem>,
    pub(crate) by_id: HashMap<ItemId, usize>,
    /// Lower-cased origin -> positions
    pub(crate) origin_index: HashMap<String, Vec<usize>>,
}

impl CatalogIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get an item by id
    pub fn get(&self, id: &str) -> Option<&CatalogItem> {
        self.by_id.get(id).map(|&pos| &self.items[pos])
    }

    /// All items in load order
    pub fn items(&self) -> &[CatalogItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Insert an item, replacing any previous item with the same id.
    pub fn insert(&mut self, item: CatalogItem) {
        if let Some(&pos) = self.by_id.get(&item.id) {
            let old_origin = self.items[pos].origin.to_lowercase();
            if let Some(positions) = self.origin_index.get_mut(&old_origin) {
                positions.retain(|&p| p != pos);
            }
            self.origin_index
                .entry(item.origin.to_lowercase())
                .or_default()
                .push(pos);
            self.items[pos] = item;
            return;
        }

        let pos = self.items.len();
        self.by_id.insert(item.id.clone(), pos);
        self.origin_index
            .entry(item.origin.to_lowercase())
            .or_default()
            .push(pos);
        self.items.push(item);
    }

    /// Distinct origins present in the catalog (lower-cased)
    pub fn origins(&self) -> Vec<&str> {
        let mut origins: Vec<&str> = self.origin_index.keys().map(|s| s.as_str()).collect();
        origins.sort_unstable();
        origins
    }
}
