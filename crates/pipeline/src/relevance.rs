//! Heuristic relevance scoring for backfill.
//!
//! When the model names fewer items than requested, the remaining candidates
//! are ranked by how well they fit keyword hints in the request and the top
//! ones fill the gap.
//!
//! ## Scoring
//! - smoky / peat: `smoke * 2`
//! - smooth: `(5 - smoke) + (3 - |body - 2|)`
//! - sweet: `sweetness * 2`
//! - light: `5 - body`
//! - rich: `richness`
//! - price ceiling mentioned: `+2` when the item is within it

use catalog::CatalogItem;
use once_cell::sync::Lazy;
use rayon::prelude::*;
use regex::Regex;
use std::cmp::Ordering;

static PRICE_CEILING: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+)만원|(\d{5,})원").unwrap());

// English hints must be whole words ("delightful" is not "light")
static EN_SMOKY: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(?:smoky|peat|peaty)\b").unwrap());
static EN_SMOOTH: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bsmooth\b").unwrap());
static EN_SWEET: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bsweet\b").unwrap());
static EN_LIGHT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\blight\b").unwrap());
static EN_RICH: Lazy<Regex> = Lazy::new(|| Regex::new(r"\brich\b").unwrap());

/// Keyword hints read from a request
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RelevanceHints {
    pub smoky: bool,
    pub smooth: bool,
    pub sweet: bool,
    pub light: bool,
    pub rich: bool,
    pub price_ceiling: Option<f64>,
}

impl RelevanceHints {
    pub fn from_query(text: &str) -> Self {
        let lower = text.to_lowercase();
        let has = |korean: &[&str], english: &Regex| {
            korean.iter().any(|t| lower.contains(t)) || english.is_match(&lower)
        };

        let price_ceiling = PRICE_CEILING.captures(&lower).and_then(|caps| {
            match (caps.get(1), caps.get(2)) {
                (Some(manwon), _) => manwon.as_str().parse::<f64>().ok().map(|v| v * 10_000.0),
                (None, Some(won)) => won.as_str().parse::<f64>().ok(),
                (None, None) => None,
            }
        });

        Self {
            smoky: has(&["스모키", "피트"], &EN_SMOKY),
            smooth: has(&["부드러운"], &EN_SMOOTH),
            sweet: has(&["달콤"], &EN_SWEET),
            light: has(&["라이트"], &EN_LIGHT),
            rich: has(&["풍부"], &EN_RICH),
            price_ceiling,
        }
    }

    pub fn score(&self, item: &CatalogItem) -> f32 {
        let f = &item.flavor;
        let mut score = 0.0;

        if self.smoky {
            score += f.smoke * 2.0;
        }
        if self.smooth {
            score += (5.0 - f.smoke) + (3.0 - (f.body - 2.0).abs());
        }
        if self.sweet {
            score += f.sweetness * 2.0;
        }
        if self.light {
            score += 5.0 - f.body;
        }
        if self.rich {
            score += f.richness;
        }
        if let Some(ceiling) = self.price_ceiling {
            if item.price > 0.0 && ceiling > 0.0 && item.price <= ceiling {
                score += 2.0;
            }
        }

        score
    }
}

/// Ranks candidates by `RelevanceHints::score`, best first.
///
/// Scores are computed in parallel; ties keep their input order.
#[derive(Debug, Clone)]
pub struct RelevanceScorer {
    hints: RelevanceHints,
}

impl RelevanceScorer {
    pub fn new(query: &str) -> Self {
        Self {
            hints: RelevanceHints::from_query(query),
        }
    }

    pub fn hints(&self) -> &RelevanceHints {
        &self.hints
    }

    pub fn rank(&self, candidates: Vec<CatalogItem>) -> Vec<CatalogItem> {
        let scores: Vec<f32> = candidates
            .par_iter()
            .map(|item| self.hints.score(item))
            .collect();

        let mut scored: Vec<(f32, CatalogItem)> = scores.into_iter().zip(candidates).collect();
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));
        scored.into_iter().map(|(_, item)| item).collect()
    }
}
