//! CatalogIndex building and query logic.
//!
//! Loading goes file -> parser -> index -> validate. The query helpers
//! here are synchronous; `store.rs` wraps them behind the async
//! `CatalogStore` trait.

use crate::error::{CatalogError, Result};
use crate::parser;
use crate::types::*;
use std::collections::HashSet;
use std::path::Path;
use tracing::info;

impl CatalogIndex {
    /// Load a catalog from a JSON file
    ///
    /// Steps:
    /// 1. Parse all records
    /// 2. Reject duplicate ids
    /// 3. Build the id and origin indices
    pub fn load_from_file(path: &Path) -> Result<Self> {
        info!("Loading catalog from {:?}", path);
        let items = parser::parse_file(path)?;
        let index = Self::from_items(items)?;
        info!("Catalog loaded: {} items, {} origins", index.len(), index.origin_index.len());
        Ok(index)
    }

    /// Build an index from already-parsed items, rejecting duplicate ids
    pub fn from_items(items: Vec<CatalogItem>) -> Result<Self> {
        Self::validate(&items)?;
        let mut index = Self::new();
        for item in items {
            index.insert(item);
        }
        Ok(index)
    }

    /// Validate data integrity
    ///
    /// Check that:
    /// - ids are unique
    /// - prices are non-negative
    pub fn validate(items: &[CatalogItem]) -> Result<()> {
        let mut seen: HashSet<&str> = HashSet::with_capacity(items.len());
        for (record, item) in items.iter().enumerate() {
            if !seen.insert(item.id.as_str()) {
                return Err(CatalogError::DuplicateId(item.id.clone()));
            }
            if item.price < 0.0 {
                return Err(CatalogError::InvalidValue {
                    record,
                    field: "price".to_string(),
                    value: item.price.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Items priced within `[min, max]`, in load order
    pub fn find_by_price_range(&self, min: f64, max: f64, cap: usize) -> Vec<CatalogItem> {
        self.items
            .iter()
            .filter(|item| item.price >= min && item.price <= max)
            .take(cap)
            .cloned()
            .collect()
    }

    /// Items whose every flavor axis is within `tolerance` of the target
    pub fn find_by_flavor(&self, target: &FlavorProfile, tolerance: f32, cap: usize) -> Vec<CatalogItem> {
        self.items
            .iter()
            .filter(|item| item.flavor.within(target, tolerance))
            .take(cap)
            .cloned()
            .collect()
    }

    /// Items whose origin contains `needle` (case-insensitive), in load order
    pub fn find_by_origin(&self, needle: &str, cap: usize) -> Vec<CatalogItem> {
        let needle = needle.trim().to_lowercase();
        let mut positions: Vec<usize> = self
            .origin_index
            .iter()
            .filter(|(origin, _)| origin.contains(&needle))
            .flat_map(|(_, positions)| positions.iter().copied())
            .collect();
        positions.sort_unstable();
        positions
            .into_iter()
            .take(cap)
            .map(|pos| self.items[pos].clone())
            .collect()
    }

    /// Items whose type contains `needle` (case-insensitive)
    pub fn find_by_type(&self, needle: &str, cap: usize) -> Vec<CatalogItem> {
        let needle = needle.trim().to_lowercase();
        self.items
            .iter()
            .filter(|item| item.item_type.to_lowercase().contains(&needle))
            .take(cap)
            .cloned()
            .collect()
    }

    /// Items whose name contains `needle` (case-insensitive)
    pub fn search_by_name(&self, needle: &str) -> Vec<&CatalogItem> {
        let needle = needle.trim().to_lowercase();
        self.items
            .iter()
            .filter(|item| item.name.to_lowercase().contains(&needle))
            .collect()
    }
}
