//! Ordered chain of fast-path filters.
//!
//! Each filter sees the output of the previous one. The fast path decides
//! afterwards whether the survivors are enough or the filters should be
//! dropped altogether.

use crate::constraints::QueryConstraints;
use crate::filters::{FlavorRuleFilter, OriginFilter, PriceRangeFilter};
use crate::traits::Filter;
use anyhow::Result;
use catalog::CatalogItem;
use tracing;

/// Chains multiple filters together into a processing pipeline.
///
/// ## Usage
/// ```ignore
/// let pipeline = FilterPipeline::new()
///     .add_filter(PriceRangeFilter)
///     .add_filter(FlavorRuleFilter)
///     .add_filter(OriginFilter);
///
/// let filtered = pipeline.apply(candidates, &QueryConstraints::parse(text))?;
/// ```
pub struct FilterPipeline {
    filters: Vec<Box<dyn Filter>>,
}

impl FilterPipeline {
    /// Create a new empty FilterPipeline.
    pub fn new() -> Self {
        Self {
            filters: Vec::new(),
        }
    }

    /// Price, then flavor, then origin: the fast path's standard chain
    pub fn standard() -> Self {
        Self::new()
            .add_filter(PriceRangeFilter)
            .add_filter(FlavorRuleFilter)
            .add_filter(OriginFilter)
    }

    /// Add a filter to the pipeline (builder pattern).
    pub fn add_filter(mut self, filter: impl Filter + 'static) -> Self {
        self.filters.push(Box::new(filter));
        self
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Apply all filters in sequence to the candidates.
    ///
    /// ## Algorithm
    /// 1. Start with the input candidates
    /// 2. For each filter in order:
    ///    a. Log filter name and input count
    ///    b. Apply the filter
    ///    c. Log output count
    /// 3. Return final filtered set
    pub fn apply(
        &self,
        candidates: Vec<CatalogItem>,
        constraints: &QueryConstraints,
    ) -> Result<Vec<CatalogItem>> {
        let mut current = candidates;
        for filter in &self.filters {
            tracing::debug!(
                "Applying filter: {} (input count: {})",
                filter.name(),
                current.len()
            );
            current = filter.apply(current, constraints)?;
            tracing::debug!(
                "Filter applied: {} (output count: {})",
                filter.name(),
                current.len()
            );
        }
        Ok(current)
    }
}

impl Default for FilterPipeline {
    fn default() -> Self {
        Self::new()
    }
}
