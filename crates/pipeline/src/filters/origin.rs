//! Keeps candidates from the requested origin (case-insensitive substring).

use crate::constraints::QueryConstraints;
use crate::traits::Filter;
use anyhow::Result;
use catalog::CatalogItem;

pub struct OriginFilter;

impl Filter for OriginFilter {
    fn name(&self) -> &str {
        "OriginFilter"
    }

    fn apply(
        &self,
        candidates: Vec<CatalogItem>,
        constraints: &QueryConstraints,
    ) -> Result<Vec<CatalogItem>> {
        let Some(origin) = constraints.origin else {
            return Ok(candidates);
        };
        let needle = origin.to_lowercase();

        Ok(candidates
            .into_iter()
            .filter(|item| item.origin.to_lowercase().contains(&needle))
            .collect())
    }
}
