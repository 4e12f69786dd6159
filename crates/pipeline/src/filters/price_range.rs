//! Keeps candidates whose price falls inside the requested bounds.

use crate::constraints::QueryConstraints;
use crate::traits::Filter;
use anyhow::Result;
use catalog::CatalogItem;

pub struct PriceRangeFilter;

impl Filter for PriceRangeFilter {
    fn name(&self) -> &str {
        "PriceRangeFilter"
    }

    fn apply(
        &self,
        candidates: Vec<CatalogItem>,
        constraints: &QueryConstraints,
    ) -> Result<Vec<CatalogItem>> {
        let Some(bounds) = constraints.price else {
            return Ok(candidates);
        };

        Ok(candidates
            .into_iter()
            .filter(|item| bounds.contains(item.price))
            .collect())
    }
}
