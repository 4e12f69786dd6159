//! Extraction strategies, tried in priority order by `ResponseParser`.
//!
//! 1. `JsonSelection`: strict schema, ids resolved against the candidates
//! 2. `TableRow`: pipe-delimited rows in free text
//! 3. `KnownName`: item names mentioned anywhere in the text
//! 4. `StaticDefaults`: a fixed list, always succeeds
//!
//! Only the first yields `Confidence::High`. Every strategy except the
//! static defaults returns catalog-shaped items that the caller may pad
//! to the requested count.

use super::reasons::profile_reason;
use super::schema::{parse_selection, ParseFailure};
use crate::types::{Confidence, RecommendationItem, RecommendationResult};
use catalog::{CatalogItem, FlavorProfile, ItemId};
use std::collections::HashMap;
use tracing::debug;

/// What a strategy may consult besides the raw text
pub struct ParseContext<'a> {
    pub limit: usize,
    /// Items the model was allowed to choose from, by id
    pub candidates: &'a HashMap<ItemId, CatalogItem>,
}

pub trait Strategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// A result, or `None` to hand over to the next strategy
    fn extract(&self, raw: &str, ctx: &ParseContext<'_>) -> Option<RecommendationResult>;

    /// Whether a short result may be backfilled from the catalog
    fn allows_backfill(&self) -> bool {
        true
    }
}

// =============================================================================
// 1. Strict JSON
// =============================================================================

/// Schema-valid replies are accepted even when no id is known; unknown ids
/// are dropped and backfill makes up the count.
pub struct JsonSelection;

impl JsonSelection {
    pub fn validate(raw: &str, ctx: &ParseContext<'_>) -> Result<RecommendationResult, ParseFailure> {
        let parsed = parse_selection(raw)?;
        let items = parsed.resolve(|id| ctx.candidates.get(id), ctx.limit);
        if items.len() < parsed.ids.len().min(ctx.limit) {
            debug!(
                "Dropped {} unknown ids from the strict selection",
                parsed.ids.len().min(ctx.limit) - items.len()
            );
        }
        Ok(parsed.into_result(items, Confidence::High))
    }
}

impl Strategy for JsonSelection {
    fn name(&self) -> &'static str {
        "json-selection"
    }

    fn extract(&self, raw: &str, ctx: &ParseContext<'_>) -> Option<RecommendationResult> {
        match Self::validate(raw, ctx) {
            Ok(result) => Some(result),
            Err(failure) => {
                debug!("Strict selection rejected: {}", failure);
                None
            }
        }
    }
}

// =============================================================================
// 2. Table rows
// =============================================================================

const TABLE_REASON: &str = "Taken from a table in the model's reply";

/// Rows shaped `| Name | Price | Age | Type | Body | Richness | Smoke | Sweetness |`
pub struct TableRow;

impl TableRow {
    fn parse_row(line: &str) -> Option<CatalogItem> {
        let line = line.trim();
        if !line.contains('|') || line.contains("Name") || line.contains("---") {
            return None;
        }

        let parts: Vec<&str> = line.split('|').map(str::trim).filter(|p| !p.is_empty()).collect();
        if parts.len() < 7 {
            return None;
        }

        let name = parts[0];
        let digits: String = parts[1].chars().filter(char::is_ascii_digit).collect();
        if name.chars().count() <= 3 || digits.is_empty() {
            return None;
        }

        let score = |i: usize| {
            parts
                .get(i)
                .and_then(|p| p.parse::<f32>().ok())
                .unwrap_or(0.0)
        };

        let mut item = CatalogItem::new(String::new(), name, digits.parse::<f64>().unwrap_or(0.0))
            .with_type(parts[3])
            .with_flavor(FlavorProfile::new(score(4), score(5), score(6), score(7)));
        if let Ok(age) = parts[2].parse::<u32>() {
            item = item.with_age(age);
        }
        Some(item)
    }
}

impl Strategy for TableRow {
    fn name(&self) -> &'static str {
        "table-row"
    }

    fn extract(&self, raw: &str, ctx: &ParseContext<'_>) -> Option<RecommendationResult> {
        let items: Vec<RecommendationItem> = raw
            .lines()
            .filter_map(TableRow::parse_row)
            .take(ctx.limit)
            .enumerate()
            .map(|(n, mut row)| {
                // Prefer the real catalog entry when the row names a candidate
                if let Some(known) = ctx
                    .candidates
                    .values()
                    .find(|c| c.name.eq_ignore_ascii_case(&row.name))
                {
                    return RecommendationItem::from_catalog(known, TABLE_REASON);
                }
                row.id = format!("AG_{}", n + 1);
                RecommendationItem::from_catalog(&row, TABLE_REASON)
            })
            .collect();

        if items.is_empty() {
            return None;
        }
        Some(RecommendationResult::success(
            "Recommendations read from a tabular reply",
            items,
            "Best-effort extraction",
            Confidence::Degraded,
        ))
    }
}

// =============================================================================
// 3. Known names
// =============================================================================

/// Byte offset of the first occurrence of `needle` that is not part of a
/// longer word or number
fn find_whole(haystack: &str, needle: &str) -> Option<usize> {
    if needle.is_empty() {
        return None;
    }
    haystack.match_indices(needle).map(|(pos, _)| pos).find(|&pos| {
        let before = haystack[..pos].chars().next_back();
        let after = haystack[pos + needle.len()..].chars().next();
        !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
    })
}

/// Candidates named in `text`, in text order. A name nested inside a longer
/// matched name does not count.
fn mentioned_candidates<'a>(text: &str, candidates: &'a HashMap<ItemId, CatalogItem>) -> Vec<&'a CatalogItem> {
    let mut spans: Vec<(usize, usize, &CatalogItem)> = candidates
        .values()
        .filter_map(|c| {
            let name = c.name.to_lowercase();
            find_whole(text, &name).map(|pos| (pos, pos + name.len(), c))
        })
        .collect();
    // Earliest first, longest first at the same position
    spans.sort_by(|a, b| {
        a.0.cmp(&b.0)
            .then_with(|| b.1.cmp(&a.1))
            .then_with(|| a.2.id.cmp(&b.2.id))
    });

    let mut taken_until = 0;
    let mut mentioned = Vec::new();
    for (start, end, item) in spans {
        if start < taken_until {
            continue;
        }
        taken_until = end;
        mentioned.push(item);
    }
    mentioned
}

/// Well-known bottles recognised by the first word of their name
fn known_items() -> Vec<CatalogItem> {
    let single_malt = |id: &str, name: &str, price: f64, age: u32, flavor: [f32; 4]| {
        CatalogItem::new(id, name, price)
            .with_origin("Scotland")
            .with_type("SINGLE_MALT")
            .with_age(age)
            .with_flavor(FlavorProfile::new(flavor[0], flavor[1], flavor[2], flavor[3]))
    };

    vec![
        single_malt("AG_1", "Laphroaig 10 Year Old", 77_400.0, 10, [3.0, 5.0, 5.0, 2.0]),
        single_malt("AG_2", "Tamdhu 12 Year Old", 94_100.0, 12, [2.0, 3.0, 0.0, 3.0]),
        single_malt("AG_3", "Glenmorangie Quinta Ruban 14 Year Old", 90_300.0, 14, [4.0, 4.0, 0.0, 3.0]),
        single_malt("AG_4", "Macallan 15 Year Old Double Cask", 278_100.0, 15, [3.0, 3.0, 0.0, 3.0]),
        single_malt("AG_5", "Glendronach 15 Year Old", 153_700.0, 15, [4.0, 4.0, 0.0, 4.0]),
    ]
}

pub struct KnownName;

impl Strategy for KnownName {
    fn name(&self) -> &'static str {
        "known-name"
    }

    fn extract(&self, raw: &str, ctx: &ParseContext<'_>) -> Option<RecommendationResult> {
        let lower = raw.to_lowercase();

        // Candidates mentioned by full name first
        let mut items: Vec<RecommendationItem> = mentioned_candidates(&lower, ctx.candidates)
            .into_iter()
            .take(ctx.limit)
            .map(|item| RecommendationItem::from_catalog(item, profile_reason(item)))
            .collect();

        if items.is_empty() {
            items = known_items()
                .iter()
                .filter(|item| {
                    item.name
                        .split_whitespace()
                        .next()
                        .is_some_and(|first| find_whole(&lower, &first.to_lowercase()).is_some())
                })
                .take(ctx.limit)
                .map(|item| RecommendationItem::from_catalog(item, profile_reason(item)))
                .collect();
        }

        if items.is_empty() {
            return None;
        }
        Some(RecommendationResult::success(
            "Recommendations recognised by name in the reply",
            items,
            "Best-effort extraction",
            Confidence::Degraded,
        ))
    }
}

// =============================================================================
// 4. Static defaults
// =============================================================================

/// Fixed picks with their own ids, so none can be mistaken for a catalog row
pub fn default_items() -> Vec<RecommendationItem> {
    let entry = |item: CatalogItem, reason: &str| RecommendationItem::from_catalog(&item, reason);

    vec![
        entry(
            CatalogItem::new("DEFAULT_1", "Tamdhu 12 Year Old", 94_100.0)
                .with_age(12)
                .with_origin("Scotland")
                .with_type("SINGLE_MALT")
                .with_image("/images/tamob.12yo.jpg")
                .with_flavor(FlavorProfile::new(2.0, 3.0, 0.0, 3.0)),
            "Smooth and balanced, an easy first single malt",
        ),
        entry(
            CatalogItem::new("DEFAULT_2", "Laphroaig 10 Year Old", 77_400.0)
                .with_age(10)
                .with_origin("Scotland")
                .with_type("SINGLE_MALT")
                .with_image("/images/lrgob.10yov1.jpg")
                .with_flavor(FlavorProfile::new(3.0, 5.0, 5.0, 2.0)),
            "Intensely smoky Islay single malt",
        ),
        entry(
            CatalogItem::new("DEFAULT_3", "Glenmorangie Quinta Ruban 14 Year Old Port Finish", 90_300.0)
                .with_age(14)
                .with_origin("Scotland")
                .with_type("SINGLE_MALT")
                .with_image("/images/gmgob.14yo.jpg")
                .with_flavor(FlavorProfile::new(4.0, 4.0, 0.0, 3.0)),
            "Port cask finish gives a rich palate",
        ),
    ]
}

pub struct StaticDefaults;

impl StaticDefaults {
    pub fn result(limit: usize) -> RecommendationResult {
        let mut items = default_items();
        items.truncate(limit);
        RecommendationResult::success(
            "The reply could not be interpreted; showing default picks",
            items,
            "Default recommendations",
            Confidence::Degraded,
        )
    }
}

impl Strategy for StaticDefaults {
    fn name(&self) -> &'static str {
        "static-defaults"
    }

    fn extract(&self, _raw: &str, ctx: &ParseContext<'_>) -> Option<RecommendationResult> {
        Some(Self::result(ctx.limit))
    }

    fn allows_backfill(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidates() -> HashMap<ItemId, CatalogItem> {
        [
            CatalogItem::new("W7", "Laphroaig 10 Year Old", 77_400.0),
            CatalogItem::new("W9", "Talisker 10 Year Old", 89_000.0),
        ]
        .into_iter()
        .map(|item| (item.id.clone(), item))
        .collect()
    }

    #[test]
    fn test_json_selection_drops_unknown_ids() {
        let candidates = candidates();
        let ctx = ParseContext { limit: 3, candidates: &candidates };

        let result = JsonSelection::validate(r#"{"ids": ["Z1"]}"#, &ctx).unwrap();
        assert!(result.recommendations.is_empty());
        assert_eq!(result.confidence, Confidence::High);
        assert!(JsonSelection.extract(r#"{"ids": ["Z1"]}"#, &ctx).is_some());
        assert_eq!(
            JsonSelection::validate(r#"{"ids": []}"#, &ctx).unwrap_err(),
            ParseFailure::EmptyIds
        );

        let result = JsonSelection::validate(r#"{"ids": ["W9", "Z1"], "reasons": {"W9": "coastal"}}"#, &ctx).unwrap();
        assert_eq!(result.recommendations.len(), 1);
        assert_eq!(result.recommendations[0].reason, "coastal");
        assert_eq!(result.confidence, Confidence::High);
    }

    #[test]
    fn test_table_rows() {
        let candidates = HashMap::new();
        let ctx = ParseContext { limit: 5, candidates: &candidates };
        let raw = "\
| Name | Price | Age | Type | Body | Richness | Smoke | Sweetness |
|------|-------|-----|------|------|----------|-------|-----------|
| Ardbeg 10 | 89,000원 | 10 | SINGLE_MALT | 4 | 4 | 5 | 1 |
| Jameson | 32,000원 | N/A | BLENDED | 2 | 2 | 0 |
| Bad | 1000 | 1 | X | 1 | 1 | 1 | 1 |";

        let result = TableRow.extract(raw, &ctx).unwrap();
        assert_eq!(result.confidence, Confidence::Degraded);
        assert_eq!(result.recommendations.len(), 2);

        let ardbeg = &result.recommendations[0];
        assert_eq!(ardbeg.id, "AG_1");
        assert_eq!(ardbeg.price, 89_000.0);
        assert_eq!(ardbeg.age, Some(10));
        assert_eq!(ardbeg.scores.smoke, 5.0);

        let jameson = &result.recommendations[1];
        assert_eq!(jameson.age, None);
        assert_eq!(jameson.scores.sweetness, 0.0);
    }

    #[test]
    fn test_table_row_resolves_candidate_by_name() {
        let candidates = candidates();
        let ctx = ParseContext { limit: 5, candidates: &candidates };
        let raw = "| Talisker 10 Year Old | 89000 | 10 | SINGLE_MALT | 4 | 4 | 3 | 2 |";

        let result = TableRow.extract(raw, &ctx).unwrap();
        assert_eq!(result.recommendations[0].id, "W9");
    }

    #[test]
    fn test_known_name_prefers_candidates() {
        let candidates = candidates();
        let ctx = ParseContext { limit: 5, candidates: &candidates };

        let result = KnownName
            .extract("I'd pick Talisker 10 Year Old, then Laphroaig 10 Year Old.", &ctx)
            .unwrap();
        let ids: Vec<&str> = result.recommendations.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["W9", "W7"]);
    }

    #[test]
    fn test_known_name_matches_whole_names_only() {
        let candidates: HashMap<ItemId, CatalogItem> = [
            CatalogItem::new("W1", "Whisky 1", 50_000.0),
            CatalogItem::new("W12", "Whisky 12", 60_000.0),
            CatalogItem::new("L10", "Laphroaig 10", 70_000.0),
            CatalogItem::new("L10Y", "Laphroaig 10 Year Old", 77_400.0),
        ]
        .into_iter()
        .map(|item| (item.id.clone(), item))
        .collect();
        let ctx = ParseContext { limit: 5, candidates: &candidates };

        let ids = |text: &str| -> Vec<String> {
            KnownName
                .extract(text, &ctx)
                .map(|r| r.recommendations.into_iter().map(|i| i.id).collect())
                .unwrap_or_default()
        };
        assert_eq!(ids("I would pick Whisky 12 for you."), vec!["W12"]);
        assert_eq!(ids("Laphroaig 10 Year Old, or Whisky 1."), vec!["L10Y", "W1"]);
        assert!(ids("Whisky 123 is not on the list").is_empty());
    }

    #[test]
    fn test_find_whole() {
        assert_eq!(find_whole("whisky 12 and whisky 1", "whisky 1"), Some(14));
        assert_eq!(find_whole("macallan", "macallan"), Some(0));
        assert_eq!(find_whole("themacallan", "macallan"), None);
        assert_eq!(find_whole("anything", ""), None);
    }

    #[test]
    fn test_known_name_fixed_list() {
        let candidates = HashMap::new();
        let ctx = ParseContext { limit: 5, candidates: &candidates };

        let result = KnownName.extract("Try a Macallan or a glendronach.", &ctx).unwrap();
        let names: Vec<&str> = result.recommendations.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["Macallan 15 Year Old Double Cask", "Glendronach 15 Year Old"]);

        assert!(KnownName.extract("nothing to see", &ctx).is_none());
    }

    #[test]
    fn test_static_defaults_respect_limit() {
        assert_eq!(StaticDefaults::result(2).recommendations.len(), 2);
        assert_eq!(StaticDefaults::result(10).recommendations.len(), 3);
        assert!(!StaticDefaults.allows_backfill());
        assert!(KnownName.allows_backfill());
        assert!(default_items().iter().all(|item| item.id.starts_with("DEFAULT_")));
    }
}
