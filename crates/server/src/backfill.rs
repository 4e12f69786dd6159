//! Pads an under-filled selection up to the requested count.

use crate::types::{RecommendationItem, BACKFILL_REASON};
use catalog::CatalogItem;
use pipeline::RelevanceScorer;
use std::collections::HashSet;
use tracing::info;

/// Append the best-ranked unused candidates until `items` holds `limit`
/// entries or the candidates run out. Longer inputs are truncated.
pub fn backfill(
    mut items: Vec<RecommendationItem>,
    candidates: &[CatalogItem],
    limit: usize,
    query: &str,
) -> Vec<RecommendationItem> {
    if items.len() >= limit {
        items.truncate(limit);
        return items;
    }

    let mut used: HashSet<&str> = items.iter().map(|item| item.id.as_str()).collect();
    let unused: Vec<CatalogItem> = candidates
        .iter()
        .filter(|item| used.insert(item.id.as_str()))
        .cloned()
        .collect();

    let need = limit - items.len();
    let ranked = RelevanceScorer::new(query).rank(unused);
    let added: Vec<RecommendationItem> = ranked
        .iter()
        .take(need)
        .map(|item| RecommendationItem::from_catalog(item, BACKFILL_REASON))
        .collect();

    info!(
        "Backfilled {} of {} missing items ({} candidates available)",
        added.len(),
        need,
        ranked.len()
    );
    items.extend(added);
    items
}
