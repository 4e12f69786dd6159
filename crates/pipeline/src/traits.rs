//! The seam every fast-path filter plugs into.

use crate::constraints::QueryConstraints;
use anyhow::Result;
use catalog::CatalogItem;

/// A narrowing step over catalog items, driven by constraints parsed from
/// the request text.
///
/// A filter whose constraint is absent from `QueryConstraints` must return
/// its input unchanged.
pub trait Filter: Send + Sync {
    /// Short name used in pipeline logs
    fn name(&self) -> &str;

    fn apply(
        &self,
        candidates: Vec<CatalogItem>,
        constraints: &QueryConstraints,
    ) -> Result<Vec<CatalogItem>>;
}
